//! Workflow service for entry status transitions.
//!
//! Each method checks the entry against the operation's precondition and
//! returns the compare-and-set [`StatusUpdate`] the store should apply. Nothing
//! here touches the store.

use crate::journal::{BalanceValidator, EntryStatus, JournalEntry, validate_lines};
use crate::store::{StatusUpdate, TransitionMetadata};

use super::error::WorkflowError;
use super::selection::SelectionFilter;
use super::types::{BatchOperation, WorkflowPolicy};

/// Stateless service for entry workflow transitions.
pub struct WorkflowService;

impl WorkflowService {
    /// Submit a draft entry for approval.
    ///
    /// # Errors
    /// * `WorkflowError::InvalidTransition` if the entry is not a draft
    pub fn submit(
        entry: &JournalEntry,
        metadata: TransitionMetadata,
        policy: &WorkflowPolicy,
    ) -> Result<StatusUpdate, WorkflowError> {
        Self::transition(entry, BatchOperation::Submit, metadata, policy)
    }

    /// Approve a pending entry.
    ///
    /// In post-on-approval mode the entry must also pass the posting checks.
    ///
    /// # Errors
    /// * `WorkflowError::InvalidTransition` if the entry is not pending approval
    /// * `WorkflowError::Journal` if it would be posted and is invalid or unbalanced
    pub fn approve(
        entry: &JournalEntry,
        metadata: TransitionMetadata,
        policy: &WorkflowPolicy,
        validator: &BalanceValidator,
    ) -> Result<StatusUpdate, WorkflowError> {
        let update = Self::transition(entry, BatchOperation::Approve, metadata, policy)?;
        if update.new_status == EntryStatus::Posted {
            Self::ensure_postable(entry, validator)?;
        }
        Ok(update)
    }

    /// Post an entry to the ledger.
    ///
    /// # Errors
    /// * `WorkflowError::InvalidTransition` if the entry's status is not postable
    /// * `WorkflowError::Journal` if the lines are invalid or unbalanced
    pub fn post(
        entry: &JournalEntry,
        metadata: TransitionMetadata,
        policy: &WorkflowPolicy,
        validator: &BalanceValidator,
    ) -> Result<StatusUpdate, WorkflowError> {
        let update = Self::transition(entry, BatchOperation::Post, metadata, policy)?;
        Self::ensure_postable(entry, validator)?;
        Ok(update)
    }

    /// Checks the rules an entry must meet before it becomes `POSTED`.
    ///
    /// # Errors
    /// Returns the first structural violation, then `JournalError::Unbalanced`.
    pub fn ensure_postable(
        entry: &JournalEntry,
        validator: &BalanceValidator,
    ) -> Result<(), WorkflowError> {
        validate_lines(&entry.lines, validator.policy().minor_units)?;
        validator.ensure_balanced(&entry.lines)?;
        Ok(())
    }

    /// Check if a status transition is valid under some policy.
    ///
    /// Valid transitions:
    /// - Draft → PendingApproval (submit)
    /// - PendingApproval → Approved | Posted (approve)
    /// - Draft | Approved → Posted (post)
    /// - Posted → Reversed (reverse)
    #[must_use]
    pub fn is_valid_transition(from: EntryStatus, to: EntryStatus) -> bool {
        matches!(
            (from, to),
            (EntryStatus::Draft, EntryStatus::PendingApproval | EntryStatus::Posted)
                | (
                    EntryStatus::PendingApproval,
                    EntryStatus::Approved | EntryStatus::Posted
                )
                | (EntryStatus::Approved, EntryStatus::Posted)
                | (EntryStatus::Posted, EntryStatus::Reversed)
        )
    }

    fn transition(
        entry: &JournalEntry,
        operation: BatchOperation,
        metadata: TransitionMetadata,
        policy: &WorkflowPolicy,
    ) -> Result<StatusUpdate, WorkflowError> {
        SelectionFilter::check(entry, operation, policy)?;
        Ok(StatusUpdate {
            id: entry.id,
            expected_status: entry.status,
            expected_version: entry.version,
            new_status: SelectionFilter::target_status(operation, policy),
            metadata,
        })
    }
}
