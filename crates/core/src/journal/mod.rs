//! Journal entry model and double-entry rules.
//!
//! - `types` - Entries, lines, statuses, kinds
//! - `balance` - The balance validator
//! - `validation` - Structural line rules
//! - `error` - Rule violations

pub mod balance;
pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod balance_props;

pub use balance::{BalanceCheck, BalancePolicy, BalanceValidator};
pub use error::JournalError;
pub use types::{
    EntryAudit, EntryKind, EntryStatus, JournalEntry, JournalLine, NewJournalEntry, Side, side_total,
};
pub use validation::validate_lines;
