//! Runs a chaincode invocation end to end: resolve peers, collect
//! endorsements, order the transaction and wait for it to commit.

pub mod builder;
pub mod error;
pub mod executor;
pub mod telemetry;

pub use builder::ExecutorBuilder;
pub use error::{ExecutionError, ExecutionStage};
pub use executor::{ExecutionSettings, Executor};
pub use telemetry::{init_tracing, TelemetryError};
