//! Result aggregation for batch and import operations.

pub mod aggregator;
pub mod types;

#[cfg(test)]
mod aggregator_props;

pub use aggregator::{aggregate, aggregate_cancelled};
pub use types::{
    FailureKind, ItemError, ItemFailure, ItemRef, ItemSuccess, OperationResult, Outcome,
    Processed, Summary,
};
