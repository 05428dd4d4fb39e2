//! Selection filter: which entries an operation may touch.

use crate::journal::{EntryStatus, JournalEntry};
use quire_shared::ApprovalMode;

use super::error::WorkflowError;
use super::types::{BatchOperation, WorkflowPolicy};

/// Stateless eligibility rules.
pub struct SelectionFilter;

impl SelectionFilter {
    /// Returns true if an entry in `status` may undergo `operation`.
    ///
    /// | operation | eligible status |
    /// |---|---|
    /// | submit | DRAFT |
    /// | approve | PENDING_APPROVAL |
    /// | post | APPROVED, and DRAFT while draft posting is allowed |
    /// | reverse | POSTED |
    #[must_use]
    pub fn is_eligible(
        status: EntryStatus,
        operation: BatchOperation,
        policy: &WorkflowPolicy,
    ) -> bool {
        match operation {
            BatchOperation::Submit => status == EntryStatus::Draft,
            BatchOperation::Approve => status == EntryStatus::PendingApproval,
            BatchOperation::Post => {
                status == EntryStatus::Approved
                    || (status == EntryStatus::Draft && policy.allow_draft_posting)
            }
            BatchOperation::Reverse => status == EntryStatus::Posted,
        }
    }

    /// Statuses eligible for `operation`, in lifecycle order.
    #[must_use]
    pub fn eligible_statuses(operation: BatchOperation, policy: &WorkflowPolicy) -> Vec<EntryStatus> {
        EntryStatus::ALL
            .into_iter()
            .filter(|status| Self::is_eligible(*status, operation, policy))
            .collect()
    }

    /// Narrows `entries` to those eligible for `operation`, keeping their order.
    pub fn eligible<'a>(
        entries: impl IntoIterator<Item = &'a JournalEntry>,
        operation: BatchOperation,
        policy: &WorkflowPolicy,
    ) -> Vec<&'a JournalEntry> {
        entries
            .into_iter()
            .filter(|entry| Self::is_eligible(entry.status, operation, policy))
            .collect()
    }

    /// Checks a single explicitly selected entry.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::AlreadyReversed` when reversing a reversed entry,
    /// otherwise `WorkflowError::InvalidTransition` for ineligible statuses.
    pub fn check(
        entry: &JournalEntry,
        operation: BatchOperation,
        policy: &WorkflowPolicy,
    ) -> Result<(), WorkflowError> {
        if Self::is_eligible(entry.status, operation, policy) {
            return Ok(());
        }
        if operation == BatchOperation::Reverse && entry.status == EntryStatus::Reversed {
            return Err(WorkflowError::AlreadyReversed);
        }
        Err(WorkflowError::InvalidTransition {
            operation,
            from: entry.status,
        })
    }

    /// Status an entry reaches after `operation`.
    #[must_use]
    pub const fn target_status(operation: BatchOperation, policy: &WorkflowPolicy) -> EntryStatus {
        match operation {
            BatchOperation::Submit => EntryStatus::PendingApproval,
            BatchOperation::Approve => match policy.approval_mode {
                ApprovalMode::Stage => EntryStatus::Approved,
                ApprovalMode::Post => EntryStatus::Posted,
            },
            BatchOperation::Post => EntryStatus::Posted,
            BatchOperation::Reverse => EntryStatus::Reversed,
        }
    }
}
