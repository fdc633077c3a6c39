use fabric_tx_types::{ClassifiedResponses, NodeResponse, ProposalStatus};
use std::sync::Arc;

/// Splits proposal responses into endorsed and rejected by status alone
#[derive(Debug, Clone, Copy)]
pub struct ResponseClassifier {
    expected: ProposalStatus,
}

impl Default for ResponseClassifier {
    fn default() -> Self {
        Self::new(ProposalStatus::Success)
    }
}

impl ResponseClassifier {
    pub fn new(expected: ProposalStatus) -> Self {
        Self { expected }
    }

    pub fn expected(&self) -> ProposalStatus {
        self.expected
    }

    /// Input order is kept within each partition
    pub fn classify(&self, responses: &[Arc<NodeResponse>]) -> ClassifiedResponses {
        let (accepted, rejected): (Vec<_>, Vec<_>) = responses
            .iter()
            .cloned()
            .partition(|r| r.status == self.expected);

        ClassifiedResponses { accepted, rejected }
    }
}
