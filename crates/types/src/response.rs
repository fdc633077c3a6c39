use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome a single peer reported for a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Success,
    Failure,
    /// No answer within the wait window, or the transport failed
    Unreachable,
}

impl ProposalStatus {
    /// Map a chaincode response code onto a status
    pub fn from_code(code: u32) -> Self {
        if (200..400).contains(&code) {
            ProposalStatus::Success
        } else {
            ProposalStatus::Failure
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProposalStatus::Success => f.write_str("SUCCESS"),
            ProposalStatus::Failure => f.write_str("FAILURE"),
            ProposalStatus::Unreachable => f.write_str("UNREACHABLE"),
        }
    }
}

/// One peer's answer to a proposal. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeResponse {
    pub node: String,
    pub status: ProposalStatus,
    pub payload: Vec<u8>,
    pub message: String,
}

impl NodeResponse {
    pub fn success(node: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            node: node.into(),
            status: ProposalStatus::Success,
            payload: payload.into(),
            message: String::new(),
        }
    }

    pub fn failure(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            status: ProposalStatus::Failure,
            payload: Vec::new(),
            message: message.into(),
        }
    }

    pub fn unreachable(node: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            status: ProposalStatus::Unreachable,
            payload: Vec::new(),
            message: reason.into(),
        }
    }

    pub fn is_unreachable(&self) -> bool {
        self.status == ProposalStatus::Unreachable
    }

    /// Payload decoded as UTF-8, lossy
    pub fn payload_str(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_code() {
        assert_eq!(ProposalStatus::from_code(200), ProposalStatus::Success);
        assert_eq!(ProposalStatus::from_code(302), ProposalStatus::Success);
        assert_eq!(ProposalStatus::from_code(400), ProposalStatus::Failure);
        assert_eq!(ProposalStatus::from_code(500), ProposalStatus::Failure);
        assert_eq!(ProposalStatus::from_code(0), ProposalStatus::Failure);
    }

    #[test]
    fn test_constructors() {
        let ok = NodeResponse::success("peer0", "OK");
        assert_eq!(ok.payload_str(), "OK");
        assert!(!ok.is_unreachable());

        let down = NodeResponse::unreachable("peer1", "timed out");
        assert!(down.is_unreachable());
        assert!(down.payload.is_empty());
    }
}
