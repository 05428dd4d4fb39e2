//! Journal rule violations.
//!
//! These errors describe why a set of lines cannot become (or stay) a valid
//! journal entry. Line numbers are 1-based positions within the entry.

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::Side;

/// Errors raised by the line rules and the balance validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JournalError {
    /// Entry must have at least 2 lines.
    #[error("Entry must have at least 2 lines")]
    InsufficientLines,

    /// Entry has only debit lines or only credit lines.
    #[error("Entry must have both debit and credit lines")]
    SingleSided,

    /// Debits and credits differ by more than the tolerance.
    #[error("Entry is not balanced. Debit: {debit}, Credit: {credit}, Difference: {delta}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
        /// Signed difference (debit - credit).
        delta: Decimal,
    },

    /// Line has no account code.
    #[error("Line {line}: account code is required")]
    MissingAccountCode {
        /// 1-based line number.
        line: usize,
    },

    /// Line amount is negative.
    #[error("Line {line}: amounts cannot be negative")]
    NegativeAmount {
        /// 1-based line number.
        line: usize,
    },

    /// Line has neither a debit nor a credit.
    #[error("Line {line}: either debit or credit must be non-zero")]
    ZeroLine {
        /// 1-based line number.
        line: usize,
    },

    /// Line has both a debit and a credit.
    #[error("Line {line}: specify either debit or credit, not both")]
    BothSides {
        /// 1-based line number.
        line: usize,
    },

    /// Line amount is finer than the currency's minor unit.
    #[error("Line {line}: amount {amount} has more than {minor_units} decimal places")]
    ExcessPrecision {
        /// 1-based line number.
        line: usize,
        /// The offending amount.
        amount: Decimal,
        /// Allowed decimal places.
        minor_units: u32,
    },

    /// A column total does not fit in a `Decimal`.
    #[error("Total {side} amount exceeds the supported range")]
    AmountOverflow {
        /// The overflowing column.
        side: Side,
    },
}

impl JournalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::SingleSided => "SINGLE_SIDED",
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
            Self::MissingAccountCode { .. } => "MISSING_ACCOUNT_CODE",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::ZeroLine { .. } => "ZERO_LINE",
            Self::BothSides { .. } => "BOTH_SIDES",
            Self::ExcessPrecision { .. } => "EXCESS_PRECISION",
            Self::AmountOverflow { .. } => "AMOUNT_OVERFLOW",
        }
    }
}
