//! Export options.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::ExportError;
use crate::journal::{EntryKind, EntryStatus};
use crate::store::EntryFilter;

/// Row layout of an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// One row per line, in the import layout.
    #[default]
    Detailed,
    /// One row per entry.
    Summary,
}

impl ExportFormat {
    /// Returns the string representation of the format.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Detailed => "detailed",
            Self::Summary => "summary",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Byte encoding of an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Plain UTF-8 CSV with `\n` line endings.
    #[default]
    Csv,
    /// Spreadsheet-friendly CSV: UTF-8 byte order mark and CRLF line endings.
    Excel,
}

impl FileFormat {
    /// MIME type of the produced bytes.
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Excel => "application/vnd.ms-excel",
        }
    }
}

/// Caller-supplied export options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    /// Row layout.
    pub format: ExportFormat,
    /// Byte encoding.
    pub file_format: FileFormat,
    /// Earliest accounting date (inclusive).
    pub date_from: Option<NaiveDate>,
    /// Latest accounting date (inclusive).
    pub date_to: Option<NaiveDate>,
    /// Required status.
    pub status: Option<EntryStatus>,
    /// Required kind.
    pub entry_type: Option<EntryKind>,
}

impl ExportOptions {
    /// Checks the date range.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::InvalidDateRange` when `dateFrom` is after `dateTo`.
    pub fn validate(&self) -> Result<(), ExportError> {
        match (self.date_from, self.date_to) {
            (Some(from), Some(to)) if from > to => Err(ExportError::InvalidDateRange { from, to }),
            _ => Ok(()),
        }
    }

    /// The store filter these options select.
    #[must_use]
    pub const fn filter(&self) -> EntryFilter {
        EntryFilter {
            date_from: self.date_from,
            date_to: self.date_to,
            status: self.status,
            kind: self.entry_type,
        }
    }

    /// Deterministic download name, e.g. `journal-entries-summary-2024-01-01-end.csv`.
    #[must_use]
    pub fn filename(&self) -> String {
        let from = self
            .date_from
            .map_or_else(|| "start".to_string(), |d| d.to_string());
        let to = self.date_to.map_or_else(|| "end".to_string(), |d| d.to_string());
        format!("journal-entries-{}-{from}-{to}.csv", self.format)
    }
}
