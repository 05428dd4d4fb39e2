//! In-memory entry store.
//!
//! Entries live in a sharded concurrent map. Every write re-checks the status
//! and version the caller read while holding the entry's shard lock, so two
//! writers racing on one entry cannot both succeed.

use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;

use quire_core::journal::{EntryStatus, JournalEntry, NewJournalEntry};
use quire_core::store::{
    EntryFilter, EntryStore, ReversalWrite, StatusUpdate, StoreError, TransitionMetadata,
};
use quire_core::workflow::WorkflowService;
use quire_shared::types::EntryId;

/// Entry store backed by a [`DashMap`].
#[derive(Debug, Default)]
pub struct InMemoryEntryStore {
    entries: DashMap<EntryId, JournalEntry>,
}

impl InMemoryEntryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A copy of one entry.
    #[must_use]
    pub fn snapshot(&self, id: EntryId) -> Option<JournalEntry> {
        self.entries.get(&id).map(|entry| entry.clone())
    }

    fn conflict(
        entry: &JournalEntry,
        expected_status: EntryStatus,
        expected_version: u64,
    ) -> StoreError {
        StoreError::Conflict {
            id: entry.id,
            expected_status,
            expected_version,
            actual_status: entry.status,
            actual_version: entry.version,
        }
    }
}

/// Records the audit fields of a status change.
fn record_transition(entry: &mut JournalEntry, new_status: EntryStatus, meta: &TransitionMetadata) {
    let audit = &mut entry.audit;
    match new_status {
        EntryStatus::PendingApproval => {
            audit.submitted_by = Some(meta.actor);
            audit.submitted_at = Some(meta.at);
        }
        EntryStatus::Approved => {
            audit.approved_by = Some(meta.actor);
            audit.approved_at = Some(meta.at);
            audit.approval_comments.clone_from(&meta.comments);
        }
        EntryStatus::Posted => {
            if entry.status == EntryStatus::PendingApproval {
                audit.approved_by = Some(meta.actor);
                audit.approved_at = Some(meta.at);
                audit.approval_comments.clone_from(&meta.comments);
            }
            audit.posted_by = Some(meta.actor);
            audit.posted_at = Some(meta.at);
        }
        EntryStatus::Reversed => {
            audit.reversed_by = Some(meta.actor);
            audit.reversed_at = Some(meta.at);
            audit.reversal_reason.clone_from(&meta.reason);
        }
        EntryStatus::Draft => {}
    }
}

impl EntryStore for InMemoryEntryStore {
    async fn get(&self, ids: &[EntryId]) -> Result<Vec<JournalEntry>, StoreError> {
        Ok(ids.iter().filter_map(|id| self.snapshot(*id)).collect())
    }

    async fn update_status(&self, update: StatusUpdate) -> Result<JournalEntry, StoreError> {
        let mut entry = self
            .entries
            .get_mut(&update.id)
            .ok_or(StoreError::NotFound(update.id))?;

        if entry.status != update.expected_status || entry.version != update.expected_version {
            return Err(Self::conflict(
                &entry,
                update.expected_status,
                update.expected_version,
            ));
        }
        if update.new_status == EntryStatus::Reversed
            || !WorkflowService::is_valid_transition(entry.status, update.new_status)
        {
            return Err(StoreError::Rejected(format!(
                "transition {} -> {} is not allowed",
                entry.status, update.new_status
            )));
        }

        record_transition(&mut entry, update.new_status, &update.metadata);
        entry.status = update.new_status;
        entry.version += 1;

        debug!(entry_id = %entry.id, status = %entry.status, version = entry.version, "Entry status updated");
        Ok(entry.clone())
    }

    async fn create(&self, entry: NewJournalEntry) -> Result<EntryId, StoreError> {
        if entry.status == EntryStatus::Reversed {
            return Err(StoreError::Rejected(
                "entries cannot be created as REVERSED".to_string(),
            ));
        }

        let id = EntryId::new();
        self.entries.insert(
            id,
            JournalEntry {
                id,
                reference: entry.reference,
                memo: entry.memo,
                kind: entry.kind,
                status: entry.status,
                date: entry.date,
                lines: entry.lines,
                created_at: Utc::now(),
                version: 1,
                audit: entry.audit,
            },
        );
        Ok(id)
    }

    async fn query(&self, filter: &EntryFilter) -> Result<Vec<JournalEntry>, StoreError> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn reverse(&self, reversal: ReversalWrite) -> Result<EntryId, StoreError> {
        let companion_id = EntryId::new();
        let companion = reversal.reversing_entry;

        {
            let mut original = self
                .entries
                .get_mut(&reversal.original_id)
                .ok_or(StoreError::NotFound(reversal.original_id))?;

            if original.status != EntryStatus::Posted
                || original.version != reversal.expected_version
            {
                return Err(Self::conflict(
                    &original,
                    EntryStatus::Posted,
                    reversal.expected_version,
                ));
            }

            record_transition(&mut original, EntryStatus::Reversed, &reversal.metadata);
            original.audit.reversal_entry_id = Some(companion_id);
            original.status = EntryStatus::Reversed;
            original.version += 1;
        }

        // The original's shard lock is released before inserting, since the
        // companion may hash to the same shard.
        self.entries.insert(
            companion_id,
            JournalEntry {
                id: companion_id,
                reference: companion.reference,
                memo: companion.memo,
                kind: companion.kind,
                status: companion.status,
                date: companion.date,
                lines: companion.lines,
                created_at: Utc::now(),
                version: 1,
                audit: companion.audit,
            },
        );

        debug!(entry_id = %reversal.original_id, companion_id = %companion_id, "Entry reversed");
        Ok(companion_id)
    }
}
