//! Batch coordination over explicit entry selections.

pub mod coordinator;
pub mod error;
pub mod request;

pub use coordinator::{BatchCoordinator, BatchSettings};
pub use error::BatchError;
pub use request::BatchRequest;
