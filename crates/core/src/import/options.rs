//! Import options.

use serde::{Deserialize, Serialize};

use crate::journal::{EntryKind, EntryStatus};

/// Caller-supplied import options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportOptions {
    /// Reject entries whose debits and credits differ.
    pub validate_balances: bool,
    /// Create entries as `DRAFT`; otherwise as `PENDING_APPROVAL`.
    pub create_as_draft: bool,
    /// Treat the first record as a header naming the columns.
    pub skip_header_row: bool,
    /// chrono format string for the date column; the configured default when absent.
    pub date_format: Option<String>,
    /// Kind assigned to every imported entry.
    pub entry_kind: EntryKind,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            validate_balances: true,
            create_as_draft: true,
            skip_header_row: true,
            date_format: None,
            entry_kind: EntryKind::Journal,
        }
    }
}

impl ImportOptions {
    /// Status new entries are created with.
    #[must_use]
    pub const fn initial_status(&self) -> EntryStatus {
        if self.create_as_draft {
            EntryStatus::Draft
        } else {
            EntryStatus::PendingApproval
        }
    }
}
