//! Request-level batch errors.
//!
//! Per-entry failures never surface here; they are collected in the
//! operation result.

use thiserror::Error;

use quire_shared::AppError;

use crate::access::Capability;
use crate::workflow::BatchOperation;

/// Errors that abort a whole batch before any entry is processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// No entries were selected.
    #[error("At least one entry must be selected")]
    EmptySelection,

    /// A reverse request without a reason.
    #[error("A reason is required to reverse entries")]
    ReversalReasonRequired,

    /// The caller lacks the operation's capability.
    #[error("Capability '{capability}' is required to {operation} entries")]
    Forbidden {
        /// The requested operation.
        operation: BatchOperation,
        /// The missing capability.
        capability: Capability,
    },

    /// The store could not be read at all.
    #[error("Entry store unavailable: {0}")]
    StoreUnavailable(String),
}

impl BatchError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptySelection => "EMPTY_SELECTION",
            Self::ReversalReasonRequired => "REVERSAL_REASON_REQUIRED",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::EmptySelection | Self::ReversalReasonRequired => 400,
            Self::Forbidden { .. } => 403,
            Self::StoreUnavailable(_) => 503,
        }
    }
}

impl From<BatchError> for AppError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::EmptySelection | BatchError::ReversalReasonRequired => {
                Self::Validation(err.to_string())
            }
            BatchError::Forbidden { .. } => Self::Forbidden(err.to_string()),
            BatchError::StoreUnavailable(msg) => Self::StoreUnavailable(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_app_error_keeps_status() {
        let errors = [
            BatchError::EmptySelection,
            BatchError::ReversalReasonRequired,
            BatchError::Forbidden {
                operation: BatchOperation::Post,
                capability: Capability::Post,
            },
            BatchError::StoreUnavailable("timeout".into()),
        ];
        for err in errors {
            let status = err.status_code();
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_forbidden_message() {
        let err = BatchError::Forbidden {
            operation: BatchOperation::Reverse,
            capability: Capability::Reverse,
        };
        assert_eq!(
            err.to_string(),
            "Capability 'reverse' is required to reverse entries"
        );
    }
}
