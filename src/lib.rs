//! Endorse, order and confirm chaincode transactions.
//!
//! Re-exports the workspace crates under one roof:
//!
//! - [`types`]: requests, responses, events and results
//! - [`config`]: executor configuration loading and validation
//! - [`discovery`]: endorsing peer resolution
//! - [`endorsement`]: proposal broadcast and classification
//! - [`ordering`]: commit submission and confirmation
//! - [`executor`]: the end-to-end flow

pub use fabric_tx_config as config;
pub use fabric_tx_discovery as discovery;
pub use fabric_tx_endorsement as endorsement;
pub use fabric_tx_executor as executor;
pub use fabric_tx_ordering as ordering;
pub use fabric_tx_types as types;

pub use fabric_tx_executor::{ExecutionError, ExecutionStage, Executor, ExecutorBuilder};
pub use fabric_tx_types::{ExecutionResult, TransactionKind};
