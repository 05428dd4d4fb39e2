//! Import errors that abort the whole file.

use thiserror::Error;

use quire_shared::AppError;

/// Errors that stop an import before it can report per-entry outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    /// The header lacks required columns.
    #[error("CSV header is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The CSV text could not be read.
    #[error("CSV could not be read at line {line}: {message}")]
    Csv {
        /// Line where reading failed.
        line: u64,
        /// Reader message.
        message: String,
    },

    /// The caller lacks the import capability.
    #[error("Capability 'import' is required to import entries")]
    Forbidden,

    /// The store failed before any entry was created.
    #[error("Entry store unavailable: {0}")]
    StoreUnavailable(String),

    /// Validating the candidate entries did not finish.
    #[error("Import validation failed: {0}")]
    Worker(String),
}

impl ImportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingColumns(_) => "MISSING_COLUMNS",
            Self::Csv { .. } => "MALFORMED_CSV",
            Self::Forbidden => "FORBIDDEN",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::Worker(_) => "IMPORT_FAILED",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::MissingColumns(_) | Self::Csv { .. } => 400,
            Self::Forbidden => 403,
            Self::StoreUnavailable(_) => 503,
            Self::Worker(_) => 500,
        }
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv {
            line: err.position().map_or(0, csv::Position::line),
            message: err.to_string(),
        }
    }
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::MissingColumns(_) | ImportError::Csv { .. } => {
                Self::Validation(err.to_string())
            }
            ImportError::Forbidden => Self::Forbidden(err.to_string()),
            ImportError::StoreUnavailable(msg) => Self::StoreUnavailable(msg),
            ImportError::Worker(_) => Self::Internal(err.to_string()),
        }
    }
}
