pub mod address;
pub mod bindings;
pub mod chain;
pub mod configure;
pub mod error;
pub mod executor;
pub mod logging;
pub mod model;
pub mod orchestrator;
pub mod ownership;
pub mod report;
pub mod unit;
pub mod validate;

pub use chain::{ChainClient, NonceProvider, RpcChain};
pub use error::TransferError;
pub use executor::{CancelSignal, ExecutorSettings, TransferExecutor, TransferOutcome, TransferStatus};
pub use orchestrator::TransferOrchestrator;
pub use ownership::{AxieGraphql, OwnershipOracle};
pub use report::{Level, MemoryReporter, Reporter, TracingReporter};
pub use unit::TransferUnit;
pub use validate::{BatchValidator, Problem, ValidationReport};
