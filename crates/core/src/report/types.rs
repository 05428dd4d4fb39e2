//! Uniform result shape for batch and import operations.

use std::fmt;

use serde::Serialize;

use quire_shared::types::EntryId;

use crate::journal::{EntryStatus, JournalError};
use crate::store::StoreError;

/// Identifies the unit a per-item outcome refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum ItemRef {
    /// A selected entry (batch operations).
    Entry {
        /// The entry id.
        entry_id: EntryId,
    },
    /// A CSV row that could not be grouped into an entry.
    Row {
        /// 1-based line number in the CSV text.
        row: u64,
    },
    /// A group of CSV rows sharing a reference and date.
    Group {
        /// The shared reference.
        reference: String,
        /// 1-based line numbers of the rows in the group.
        rows: Vec<u64>,
    },
}

impl ItemRef {
    /// Creates an entry reference.
    #[must_use]
    pub const fn entry(entry_id: EntryId) -> Self {
        Self::Entry { entry_id }
    }

    /// Returns the entry id for entry references.
    #[must_use]
    pub const fn entry_id(&self) -> Option<EntryId> {
        match self {
            Self::Entry { entry_id } => Some(*entry_id),
            _ => None,
        }
    }

    /// Returns true for entry references.
    #[must_use]
    pub const fn is_entry(&self) -> bool {
        matches!(self, Self::Entry { .. })
    }

    /// First CSV line covered by this reference, if any.
    #[must_use]
    pub fn first_row(&self) -> Option<u64> {
        match self {
            Self::Entry { .. } => None,
            Self::Row { row } => Some(*row),
            Self::Group { rows, .. } => rows.first().copied(),
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry { entry_id } => write!(f, "entry {entry_id}"),
            Self::Row { row } => write!(f, "row {row}"),
            Self::Group { reference, rows } => {
                let rows: Vec<String> = rows.iter().map(ToString::to_string).collect();
                write!(f, "reference '{reference}' (rows {})", rows.join(", "))
            }
        }
    }
}

/// Failure category of a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// The item violates a rule (unbalanced, malformed, duplicate selection).
    Validation,
    /// The item's status no longer matches the operation's precondition.
    Conflict,
    /// The item does not exist in the store.
    NotFound,
    /// The store rejected or failed the write.
    Store,
}

/// Why a single item failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    /// Failure category.
    pub kind: FailureKind,
    /// Machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl ItemFailure {
    /// Creates a failure.
    #[must_use]
    pub fn new(kind: FailureKind, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
        }
    }

    /// Creates a validation failure.
    #[must_use]
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(FailureKind::Validation, code, message)
    }

    /// Creates a conflict failure.
    #[must_use]
    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(FailureKind::Conflict, code, message)
    }
}

impl From<JournalError> for ItemFailure {
    fn from(err: JournalError) -> Self {
        Self::validation(err.error_code(), err.to_string())
    }
}

impl From<StoreError> for ItemFailure {
    fn from(err: StoreError) -> Self {
        let kind = match err {
            StoreError::NotFound(_) => FailureKind::NotFound,
            StoreError::Conflict { .. } => FailureKind::Conflict,
            StoreError::Rejected(_) | StoreError::Unavailable(_) => FailureKind::Store,
        };
        Self::new(kind, err.error_code(), err.to_string())
    }
}

/// What a successful item produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Processed {
    /// The entry that was transitioned or created.
    pub entry_id: EntryId,
    /// Its status after the operation.
    pub status: EntryStatus,
    /// The reversing companion, for reversals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub companion_id: Option<EntryId>,
}

/// The outcome of one item, as produced by a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// The item.
    pub item: ItemRef,
    /// What happened to it.
    pub result: Result<Processed, ItemFailure>,
}

impl Outcome {
    /// Creates a successful outcome.
    #[must_use]
    pub const fn success(item: ItemRef, processed: Processed) -> Self {
        Self {
            item,
            result: Ok(processed),
        }
    }

    /// Creates a failed outcome.
    #[must_use]
    pub const fn failure(item: ItemRef, failure: ItemFailure) -> Self {
        Self {
            item,
            result: Err(failure),
        }
    }
}

/// Counts of a finished operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Items processed.
    pub total: usize,
    /// Items that succeeded.
    pub successful: usize,
    /// Items that failed.
    pub failed: usize,
}

/// A failed item in an operation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemError {
    /// The item.
    #[serde(flatten)]
    pub item: ItemRef,
    /// Failure category.
    pub kind: FailureKind,
    /// Machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
}

/// A successful item in an operation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSuccess {
    /// The item. Entry references repeat `processed.entry_id` and are omitted.
    #[serde(flatten, skip_serializing_if = "ItemRef::is_entry")]
    pub item: ItemRef,
    /// What it produced.
    #[serde(flatten)]
    pub processed: Processed,
}

/// Result of a batch or import operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OperationResult {
    /// Counts.
    pub summary: Summary,
    /// Failed items, in input order.
    pub errors: Vec<ItemError>,
    /// Successful items, in input order.
    pub successes: Vec<ItemSuccess>,
    /// True if the operation was cancelled before every item was processed.
    pub cancelled: bool,
}

impl OperationResult {
    /// Ids of failed entries, ready to be re-selected for a retry.
    #[must_use]
    pub fn failed_entry_ids(&self) -> Vec<EntryId> {
        self.errors.iter().filter_map(|e| e.item.entry_id()).collect()
    }

    /// Returns true if every processed item succeeded.
    #[must_use]
    pub const fn is_complete_success(&self) -> bool {
        self.summary.failed == 0 && !self.cancelled
    }
}
