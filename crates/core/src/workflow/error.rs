//! Workflow error types for entry lifecycle transitions.

use thiserror::Error;

use crate::journal::{EntryStatus, JournalError};
use crate::report::ItemFailure;

use super::types::BatchOperation;

/// Errors that reject a transition for a single entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// The entry's status does not allow the operation.
    #[error("Cannot {operation} entry in status {from}")]
    InvalidTransition {
        /// The attempted operation.
        operation: BatchOperation,
        /// The entry's current status.
        from: EntryStatus,
    },

    /// The entry has already been reversed.
    #[error("Entry has already been reversed")]
    AlreadyReversed,

    /// The entry's lines break a journal rule.
    #[error(transparent)]
    Journal(#[from] JournalError),
}

impl WorkflowError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_STATUS",
            Self::AlreadyReversed => "ALREADY_REVERSED",
            Self::Journal(err) => err.error_code(),
        }
    }
}

impl From<WorkflowError> for ItemFailure {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Journal(err) => err.into(),
            other => Self::conflict(other.error_code(), other.to_string()),
        }
    }
}
