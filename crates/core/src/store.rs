//! The entry store contract.
//!
//! The engine never touches storage directly; it only calls [`EntryStore`].
//! Implementations must serialize writes per entry id: a write carries the
//! status and version the caller last saw, and a mismatch is reported as
//! [`StoreError::Conflict`] instead of overwriting.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use quire_shared::AppError;
use quire_shared::types::{EntryId, UserId};

use crate::journal::{EntryKind, EntryStatus, JournalEntry, NewJournalEntry};

/// Errors returned by an entry store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No entry with this id.
    #[error("Journal entry not found: {0}")]
    NotFound(EntryId),

    /// The entry changed since the caller read it.
    #[error("Journal entry {id} was modified concurrently (expected {expected_status} v{expected_version}, found {actual_status} v{actual_version})")]
    Conflict {
        /// The entry id.
        id: EntryId,
        /// Status the caller expected.
        expected_status: EntryStatus,
        /// Version the caller expected.
        expected_version: u64,
        /// Status found in the store.
        actual_status: EntryStatus,
        /// Version found in the store.
        actual_version: u64,
    },

    /// The store refused the write.
    #[error("Entry store rejected the write: {0}")]
    Rejected(String),

    /// The store cannot be reached.
    #[error("Entry store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "ENTRY_NOT_FOUND",
            Self::Conflict { .. } => "CONCURRENT_MODIFICATION",
            Self::Rejected(_) => "STORE_REJECTED",
            Self::Unavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    /// Returns true if retrying the same write may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::Unavailable(_))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::NotFound(err.to_string()),
            StoreError::Conflict { .. } => Self::Conflict(err.to_string()),
            StoreError::Rejected(msg) => Self::Internal(msg),
            StoreError::Unavailable(msg) => Self::StoreUnavailable(msg),
        }
    }
}

/// Audit data attached to a status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionMetadata {
    /// Who performed the transition.
    pub actor: UserId,
    /// When the transition happened.
    pub at: DateTime<Utc>,
    /// Approver comments.
    pub comments: Option<String>,
    /// Reversal reason.
    pub reason: Option<String>,
}

/// A compare-and-set status change for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    /// The entry to change.
    pub id: EntryId,
    /// Status the caller read.
    pub expected_status: EntryStatus,
    /// Version the caller read.
    pub expected_version: u64,
    /// Status to write.
    pub new_status: EntryStatus,
    /// Audit data for the transition.
    pub metadata: TransitionMetadata,
}

/// Atomic reversal: mark the original `REVERSED` and create its companion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReversalWrite {
    /// The posted entry being reversed.
    pub original_id: EntryId,
    /// Version of the original the caller read.
    pub expected_version: u64,
    /// The mirrored entry to create.
    pub reversing_entry: NewJournalEntry,
    /// Audit data for the reversal.
    pub metadata: TransitionMetadata,
}

/// Query filter. `None` fields match everything; date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    /// Earliest accounting date.
    pub date_from: Option<NaiveDate>,
    /// Latest accounting date.
    pub date_to: Option<NaiveDate>,
    /// Required status.
    pub status: Option<EntryStatus>,
    /// Required kind.
    pub kind: Option<EntryKind>,
}

impl EntryFilter {
    /// Returns true if the entry passes the filter.
    #[must_use]
    pub fn matches(&self, entry: &JournalEntry) -> bool {
        self.date_from.is_none_or(|from| entry.date >= from)
            && self.date_to.is_none_or(|to| entry.date <= to)
            && self.status.is_none_or(|status| entry.status == status)
            && self.kind.is_none_or(|kind| entry.kind == kind)
    }
}

/// Persistence for journal entries.
///
/// This trait is implemented outside the core crate to provide actual storage.
pub trait EntryStore: Send + Sync {
    /// Fetch entries by id. Unknown ids are omitted from the result.
    fn get(
        &self,
        ids: &[EntryId],
    ) -> impl Future<Output = Result<Vec<JournalEntry>, StoreError>> + Send;

    /// Apply a compare-and-set status change and return the updated entry.
    fn update_status(
        &self,
        update: StatusUpdate,
    ) -> impl Future<Output = Result<JournalEntry, StoreError>> + Send;

    /// Create an entry and return its id.
    fn create(
        &self,
        entry: NewJournalEntry,
    ) -> impl Future<Output = Result<EntryId, StoreError>> + Send;

    /// List entries matching a filter, in no particular order.
    fn query(
        &self,
        filter: &EntryFilter,
    ) -> impl Future<Output = Result<Vec<JournalEntry>, StoreError>> + Send;

    /// Reverse a posted entry atomically and return the companion's id.
    fn reverse(
        &self,
        reversal: ReversalWrite,
    ) -> impl Future<Output = Result<EntryId, StoreError>> + Send;
}
