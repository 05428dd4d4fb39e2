//! Journal entry domain types.
//!
//! A journal entry is a dated set of lines that must balance (debits = credits)
//! before it can be posted. Entries are never deleted: a posted entry is undone
//! by a reversing companion entry.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use quire_shared::types::{EntryId, UserId};

/// Lifecycle status of a journal entry.
///
/// The valid transitions are:
/// - Draft → PendingApproval (submit)
/// - PendingApproval → Approved (approve, staged mode)
/// - PendingApproval → Posted (approve, post-on-approval mode)
/// - Draft | Approved → Posted (post)
/// - Posted → Reversed (reverse)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    /// Entry is being drafted and not yet validated against the ledger.
    Draft,
    /// Entry has been submitted for approval.
    PendingApproval,
    /// Entry has been approved and is waiting to be posted.
    Approved,
    /// Entry has been committed to the ledger.
    Posted,
    /// Entry has been cancelled by a reversing entry (terminal).
    Reversed,
}

impl EntryStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Draft,
        Self::PendingApproval,
        Self::Approved,
        Self::Posted,
        Self::Reversed,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::PendingApproval => "PENDING_APPROVAL",
            Self::Approved => "APPROVED",
            Self::Posted => "POSTED",
            Self::Reversed => "REVERSED",
        }
    }

    /// Parses a status, accepting any case and `-` in place of `_`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "DRAFT" => Some(Self::Draft),
            "PENDING_APPROVAL" | "PENDING" => Some(Self::PendingApproval),
            "APPROVED" => Some(Self::Approved),
            "POSTED" => Some(Self::Posted),
            "REVERSED" => Some(Self::Reversed),
            _ => None,
        }
    }

    /// Returns true if the entry can no longer change.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Reversed)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a journal entry, used by the export `entryType` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    /// General journal entry.
    #[default]
    Journal,
    /// Adjusting entry.
    Adjustment,
    /// Accrual entry.
    Accrual,
    /// Period-closing entry.
    Closing,
    /// Opening balance entry.
    OpeningBalance,
    /// Reversal of a posted entry.
    Reversal,
}

impl EntryKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Journal => "JOURNAL",
            Self::Adjustment => "ADJUSTMENT",
            Self::Accrual => "ACCRUAL",
            Self::Closing => "CLOSING",
            Self::OpeningBalance => "OPENING_BALANCE",
            Self::Reversal => "REVERSAL",
        }
    }

    /// Parses a kind, accepting any case and `-` in place of `_`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "JOURNAL" => Some(Self::Journal),
            "ADJUSTMENT" => Some(Self::Adjustment),
            "ACCRUAL" => Some(Self::Accrual),
            "CLOSING" => Some(Self::Closing),
            "OPENING_BALANCE" => Some(Self::OpeningBalance),
            "REVERSAL" => Some(Self::Reversal),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single line of a journal entry.
///
/// Exactly one of `debit` / `credit` is non-zero on a valid line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalLine {
    /// Chart-of-accounts code.
    pub account_code: String,
    /// Debit amount (zero on credit lines).
    pub debit: Decimal,
    /// Credit amount (zero on debit lines).
    pub credit: Decimal,
    /// Optional department tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Optional project tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

impl JournalLine {
    /// Creates a debit line.
    #[must_use]
    pub fn debit(account_code: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_code: account_code.into(),
            debit: amount,
            credit: Decimal::ZERO,
            department: None,
            project: None,
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(account_code: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_code: account_code.into(),
            debit: Decimal::ZERO,
            credit: amount,
            department: None,
            project: None,
        }
    }

    /// Sets the department tag.
    #[must_use]
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Sets the project tag.
    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Returns the mirror of this line: debit and credit swapped.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        Self {
            account_code: self.account_code.clone(),
            debit: self.credit,
            credit: self.debit,
            department: self.department.clone(),
            project: self.project.clone(),
        }
    }
}

/// Audit trail recorded by lifecycle transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryAudit {
    /// Who submitted the entry for approval.
    pub submitted_by: Option<UserId>,
    /// When the entry was submitted.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Who approved the entry.
    pub approved_by: Option<UserId>,
    /// When the entry was approved.
    pub approved_at: Option<DateTime<Utc>>,
    /// Approver comments.
    pub approval_comments: Option<String>,
    /// Who posted the entry.
    pub posted_by: Option<UserId>,
    /// When the entry was posted.
    pub posted_at: Option<DateTime<Utc>>,
    /// Who reversed the entry.
    pub reversed_by: Option<UserId>,
    /// When the entry was reversed.
    pub reversed_at: Option<DateTime<Utc>>,
    /// Why the entry was reversed.
    pub reversal_reason: Option<String>,
    /// The reversing companion of this entry.
    pub reversal_entry_id: Option<EntryId>,
    /// The entry this one reverses.
    pub reverses: Option<EntryId>,
}

/// A stored journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    /// Unique identifier, assigned by the store.
    pub id: EntryId,
    /// Human-readable grouping key.
    pub reference: String,
    /// Free text description.
    pub memo: String,
    /// Entry classification.
    pub kind: EntryKind,
    /// Lifecycle status.
    pub status: EntryStatus,
    /// Accounting date.
    pub date: NaiveDate,
    /// Ordered lines.
    pub lines: Vec<JournalLine>,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// Optimistic-lock token, bumped by every store write.
    pub version: u64,
    /// Transition audit trail.
    #[serde(default)]
    pub audit: EntryAudit,
}

impl JournalEntry {
    /// Sum of the debit column, `None` if it leaves the `Decimal` range.
    #[must_use]
    pub fn total_debit(&self) -> Option<Decimal> {
        side_total(&self.lines, Side::Debit)
    }

    /// Sum of the credit column, `None` if it leaves the `Decimal` range.
    #[must_use]
    pub fn total_credit(&self) -> Option<Decimal> {
        side_total(&self.lines, Side::Credit)
    }

    /// Informational total of the entry (the debit side).
    #[must_use]
    pub fn total_amount(&self) -> Option<Decimal> {
        self.total_debit()
    }
}

/// A column of the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The debit column.
    Debit,
    /// The credit column.
    Credit,
}

impl Side {
    /// Returns the string representation of the side.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// The amount a line carries on this side.
    #[must_use]
    pub const fn amount(&self, line: &JournalLine) -> Decimal {
        match self {
            Self::Debit => line.debit,
            Self::Credit => line.credit,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sums one side of `lines` with checked addition.
///
/// Returns `None` when the total leaves the `Decimal` range.
#[must_use]
pub fn side_total(lines: &[JournalLine], side: Side) -> Option<Decimal> {
    lines
        .iter()
        .map(|line| side.amount(line))
        .try_fold(Decimal::ZERO, Decimal::checked_add)
}

/// An entry about to be created in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJournalEntry {
    /// Human-readable grouping key.
    pub reference: String,
    /// Free text description.
    pub memo: String,
    /// Entry classification.
    pub kind: EntryKind,
    /// Initial status.
    pub status: EntryStatus,
    /// Accounting date.
    pub date: NaiveDate,
    /// Ordered lines.
    pub lines: Vec<JournalLine>,
    /// Initial audit trail.
    pub audit: EntryAudit,
}
