//! Endorsement phase: send a proposal to every target peer and sort the answers
//!
//! Peer failures never surface as errors here. Each becomes an
//! `Unreachable` or `Failure` response and the caller decides whether the
//! endorsements it got are enough.

pub mod broadcaster;
pub mod classifier;
pub mod error;
pub mod transport;

pub use broadcaster::ProposalBroadcaster;
pub use classifier::ResponseClassifier;
pub use error::TransportError;
pub use transport::{MockNodeTransport, NodeTransport, ProposalReply};
