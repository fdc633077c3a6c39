use thiserror::Error;

/// Failure to get any answer out of a peer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection to {node} failed: {reason}")]
    Connection { node: String, reason: String },

    #[error("peer {node} closed the stream")]
    Closed { node: String },
}
