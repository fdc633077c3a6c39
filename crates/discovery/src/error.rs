use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("no eligible endorsing node for chaincode {chaincode}")]
    NoEligibleNodes { chaincode: String },

    #[error("topology provider failed: {0}")]
    Provider(String),

    #[error("discovery via {node} failed: {reason}")]
    Discovery { node: String, reason: String },

    #[error("discovery returned no satisfiable layout for chaincode {chaincode}")]
    NoSatisfiableLayout { chaincode: String },
}
