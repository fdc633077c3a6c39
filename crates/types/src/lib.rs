pub mod chaincode;
pub mod event;
pub mod node;
pub mod response;
pub mod result;
pub mod transaction;

pub use chaincode::*;
pub use event::*;
pub use node::*;
pub use response::*;
pub use result::*;
pub use transaction::*;

/// Length in bytes of the random nonce mixed into every transaction id
pub const NONCE_LENGTH: usize = 24;

/// Default time to wait for proposal responses and commit confirmation
pub const DEFAULT_WAIT_TIME_MS: u64 = 10_000;
