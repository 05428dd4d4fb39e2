//! Export errors.

use chrono::NaiveDate;
use thiserror::Error;

use quire_shared::AppError;
use quire_shared::types::EntryId;

/// Errors that prevent an export.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// `dateFrom` is after `dateTo`.
    #[error("dateFrom ({from}) must not be after dateTo ({to})")]
    InvalidDateRange {
        /// Requested start.
        from: NaiveDate,
        /// Requested end.
        to: NaiveDate,
    },

    /// The caller lacks the export capability.
    #[error("Capability 'export' is required to export entries")]
    Forbidden,

    /// The store could not be queried.
    #[error("Entry store unavailable: {0}")]
    StoreUnavailable(String),

    /// Serializing rows failed.
    #[error("Failed to write export: {0}")]
    Write(String),

    /// An entry's total does not fit in a decimal.
    #[error("Total amount of entry {entry_id} exceeds the supported range")]
    AmountOverflow {
        /// Offending entry.
        entry_id: EntryId,
    },
}

impl ExportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::Forbidden => "FORBIDDEN",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::Write(_) => "EXPORT_FAILED",
            Self::AmountOverflow { .. } => "AMOUNT_OVERFLOW",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidDateRange { .. } => 400,
            Self::Forbidden => 403,
            Self::StoreUnavailable(_) => 503,
            Self::Write(_) | Self::AmountOverflow { .. } => 500,
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        Self::Write(err.to_string())
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::InvalidDateRange { .. } => Self::Validation(err.to_string()),
            ExportError::Forbidden => Self::Forbidden(err.to_string()),
            ExportError::StoreUnavailable(msg) => Self::StoreUnavailable(msg),
            ExportError::Write(msg) => Self::Internal(msg),
            ExportError::AmountOverflow { .. } => Self::Internal(err.to_string()),
        }
    }
}
