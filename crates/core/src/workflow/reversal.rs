//! Reversal service for undoing posted entries.
//!
//! A posted entry is never edited. It is cancelled by a companion entry whose
//! lines mirror the original (debits become credits and vice versa), and the
//! original moves to `REVERSED`.

use chrono::NaiveDate;

use crate::journal::{
    BalanceValidator, EntryAudit, EntryKind, EntryStatus, JournalEntry, JournalLine,
    NewJournalEntry,
};
use crate::store::{ReversalWrite, TransitionMetadata};

use super::error::WorkflowError;
use super::selection::SelectionFilter;
use super::types::{BatchOperation, ReversalDate, WorkflowPolicy};

/// Stateless service for creating reversing entries.
pub struct ReversalService;

impl ReversalService {
    /// Builds the atomic reversal write for a posted entry.
    ///
    /// `metadata.reason` is copied into the companion's memo and the audit
    /// trail. The companion is created `POSTED` with kind `REVERSAL`.
    ///
    /// # Errors
    /// * `WorkflowError::AlreadyReversed` / `InvalidTransition` if the entry is not posted
    /// * `WorkflowError::Journal` if the mirrored lines do not balance
    pub fn build(
        original: &JournalEntry,
        metadata: TransitionMetadata,
        policy: &WorkflowPolicy,
        validator: &BalanceValidator,
    ) -> Result<ReversalWrite, WorkflowError> {
        SelectionFilter::check(original, BatchOperation::Reverse, policy)?;

        let lines = Self::mirror_lines(&original.lines);
        validator.ensure_balanced(&lines)?;

        let reason = metadata.reason.clone().unwrap_or_default();
        let reversing_entry = NewJournalEntry {
            reference: format!("REV-{}", original.reference),
            memo: format!("Reversal of {}: {reason}", original.reference),
            kind: EntryKind::Reversal,
            status: EntryStatus::Posted,
            date: Self::reversal_date(original, &metadata, policy.reversal_date),
            lines,
            audit: EntryAudit {
                posted_by: Some(metadata.actor),
                posted_at: Some(metadata.at),
                reverses: Some(original.id),
                ..EntryAudit::default()
            },
        };

        Ok(ReversalWrite {
            original_id: original.id,
            expected_version: original.version,
            reversing_entry,
            metadata,
        })
    }

    /// Swaps debit and credit on every line, keeping order and tags.
    #[must_use]
    pub fn mirror_lines(lines: &[JournalLine]) -> Vec<JournalLine> {
        lines.iter().map(JournalLine::mirrored).collect()
    }

    fn reversal_date(
        original: &JournalEntry,
        metadata: &TransitionMetadata,
        policy: ReversalDate,
    ) -> NaiveDate {
        match policy {
            ReversalDate::Original => original.date,
            ReversalDate::Today => metadata.at.date_naive(),
            ReversalDate::Fixed(date) => date,
        }
    }
}
