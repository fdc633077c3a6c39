//! Commit phase: hand endorsed proposals to the ordering service and wait
//! for committing peers to report the outcome.

pub mod envelope;
pub mod error;
pub mod events;
pub mod submitter;
pub mod transport;
pub mod waiter;

pub use envelope::{CommitEnvelope, OrdererAck};
pub use error::{ConfirmationError, OrderingError};
pub use events::{EventSubscription, MockEventHub, EVENT_CHANNEL_CAPACITY};
pub use submitter::{CommitOptions, CommitSubmitter, PendingCommit};
pub use transport::{MockOrderer, OrderingTransport};
pub use waiter::{ConfirmationState, ConfirmationTracker, ConfirmationWaiter};
