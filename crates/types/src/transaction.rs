use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::{ChaincodeReference, NONCE_LENGTH};

/// Hex encoded SHA-256 over `nonce || creator`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(String);

impl TransactionId {
    /// Derive a fresh id for `creator` using a random nonce
    pub fn generate(creator: &[u8]) -> Self {
        let mut nonce = [0u8; NONCE_LENGTH];
        rand::thread_rng().fill_bytes(&mut nonce);
        Self::from_parts(&nonce, creator)
    }

    pub fn from_parts(nonce: &[u8], creator: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(nonce);
        hasher.update(creator);
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether an invocation changes ledger state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Evaluate only; never ordered
    Query,
    /// Endorse, order and wait for commit
    Invoke,
}

impl TransactionKind {
    pub fn is_state_changing(self) -> bool {
        matches!(self, TransactionKind::Invoke)
    }
}

impl From<bool> for TransactionKind {
    fn from(state_changing: bool) -> Self {
        if state_changing {
            TransactionKind::Invoke
        } else {
            TransactionKind::Query
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("function name must not be empty")]
    EmptyFunction,

    #[error("wait time must be greater than zero")]
    ZeroWaitTime,
}

/// A single proposal to be evaluated by endorsing peers
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    pub tx_id: TransactionId,
    pub chaincode: Arc<ChaincodeReference>,
    pub function: String,
    pub args: Vec<String>,
    /// Upper bound for collecting proposal responses
    pub max_wait: Duration,
    pub created_at: DateTime<Utc>,
}

impl TransactionRequest {
    pub fn new(
        chaincode: Arc<ChaincodeReference>,
        function: impl Into<String>,
        args: Vec<String>,
        max_wait: Duration,
        creator: &[u8],
    ) -> Result<Self, RequestError> {
        let function = function.into();
        if function.is_empty() {
            return Err(RequestError::EmptyFunction);
        }
        if max_wait.is_zero() {
            return Err(RequestError::ZeroWaitTime);
        }

        Ok(Self {
            tx_id: TransactionId::generate(creator),
            chaincode,
            function,
            args,
            max_wait,
            created_at: Utc::now(),
        })
    }

    /// Function name followed by its arguments, as chaincode receives them
    pub fn invocation_args(&self) -> Vec<&str> {
        std::iter::once(self.function.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}
