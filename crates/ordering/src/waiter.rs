use fabric_tx_types::{ConfirmationEvent, TransactionId};
use std::collections::HashSet;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::{ConfirmationError, PendingCommit};

/// Where a pending transaction stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationState {
    Pending,
    /// Holds the event that completed the requirement
    Confirmed(ConfirmationEvent),
    Rejected(ConfirmationEvent),
    TimedOut,
}

impl ConfirmationState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConfirmationState::Pending)
    }
}

/// Counts distinct confirmations for one transaction.
///
/// Exactly one terminal transition happens. Once terminal, further events
/// and expiries change nothing.
#[derive(Debug)]
pub struct ConfirmationTracker {
    tx_id: TransactionId,
    required: usize,
    confirmed_by: HashSet<String>,
    state: ConfirmationState,
}

impl ConfirmationTracker {
    pub fn new(tx_id: TransactionId, required: usize) -> Self {
        Self {
            tx_id,
            required: required.max(1),
            confirmed_by: HashSet::new(),
            state: ConfirmationState::Pending,
        }
    }

    pub fn state(&self) -> &ConfirmationState {
        &self.state
    }

    pub fn required(&self) -> usize {
        self.required
    }

    /// Distinct nodes that confirmed so far
    pub fn received(&self) -> usize {
        self.confirmed_by.len()
    }

    pub fn observe(&mut self, event: ConfirmationEvent) -> &ConfirmationState {
        if self.state.is_terminal() || event.tx_id != self.tx_id {
            return &self.state;
        }

        if !event.is_valid() {
            self.state = ConfirmationState::Rejected(event);
            return &self.state;
        }

        if self.confirmed_by.insert(event.node.clone()) && self.confirmed_by.len() >= self.required {
            self.state = ConfirmationState::Confirmed(event);
        }
        &self.state
    }

    /// The deadline passed
    pub fn expire(&mut self) -> &ConfirmationState {
        if !self.state.is_terminal() {
            self.state = ConfirmationState::TimedOut;
        }
        &self.state
    }
}

/// Waits on a pending commit's event stream
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfirmationWaiter;

impl ConfirmationWaiter {
    pub fn new() -> Self {
        Self
    }

    /// Resolve once `required` distinct nodes report a valid commit
    pub async fn await_confirmation(
        &self,
        pending: PendingCommit,
        required: usize,
        deadline: Instant,
    ) -> Result<ConfirmationEvent, ConfirmationError> {
        let PendingCommit {
            tx_id, mut events, ..
        } = pending;
        let mut tracker = ConfirmationTracker::new(tx_id.clone(), required);

        loop {
            // A stream that always has an event ready never lets the timer fire
            if Instant::now() >= deadline {
                tracker.expire();
            } else {
                match timeout_at(deadline, events.recv()).await {
                    Ok(Some(event)) => {
                        debug!(tx_id = %tx_id, node = %event.node, code = %event.validation_code, "Confirmation event");
                        tracker.observe(event);
                    }
                    Ok(None) => {
                        warn!(tx_id = %tx_id, received = tracker.received(), "Confirmation stream closed");
                        return Err(ConfirmationError::StreamClosed {
                            tx_id,
                            received: tracker.received(),
                            required: tracker.required(),
                        });
                    }
                    Err(_) => {
                        tracker.expire();
                    }
                }
            }

            match tracker.state() {
                ConfirmationState::Pending => continue,
                ConfirmationState::Confirmed(event) => {
                    info!(
                        tx_id = %tx_id,
                        block = event.block_number,
                        confirmations = tracker.received(),
                        "Transaction committed"
                    );
                    return Ok(event.clone());
                }
                ConfirmationState::Rejected(event) => {
                    warn!(tx_id = %tx_id, node = %event.node, code = %event.validation_code, "Transaction invalidated");
                    return Err(ConfirmationError::Rejected {
                        tx_id,
                        node: event.node.clone(),
                        code: event.validation_code,
                    });
                }
                ConfirmationState::TimedOut => {
                    warn!(tx_id = %tx_id, received = tracker.received(), "Timed out waiting for commit");
                    return Err(ConfirmationError::Timeout {
                        tx_id,
                        received: tracker.received(),
                        required: tracker.required(),
                    });
                }
            }
        }
    }
}
