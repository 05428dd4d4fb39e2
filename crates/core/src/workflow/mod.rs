//! Entry workflow management.
//!
//! This module implements the entry lifecycle state machine, the selection
//! filter that decides which entries an operation may touch, and reversal.
//!
//! # Modules
//!
//! - `types` - Batch operations and workflow policy
//! - `error` - Per-entry transition errors
//! - `selection` - Eligibility rules
//! - `service` - Status transitions
//! - `reversal` - Reversing entry creation

pub mod error;
pub mod reversal;
pub mod selection;
pub mod service;
pub mod types;

#[cfg(test)]
mod reversal_props;

pub use error::WorkflowError;
pub use reversal::ReversalService;
pub use selection::SelectionFilter;
pub use service::WorkflowService;
pub use types::{BatchOperation, ReversalDate, WorkflowPolicy};
