//! Double-entry balance validation.
//!
//! Debit and credit columns are summed independently with checked `Decimal`
//! addition, rounded to the currency's minor unit with banker's rounding, and
//! compared against the configured tolerance.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::error::JournalError;
use super::types::{JournalEntry, JournalLine, Side, side_total};

/// Rounding and tolerance policy for balance checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalancePolicy {
    /// Decimal places of the currency's minor unit.
    pub minor_units: u32,
    /// Largest absolute difference still treated as balanced.
    pub tolerance: Decimal,
}

impl Default for BalancePolicy {
    fn default() -> Self {
        Self {
            minor_units: 2,
            tolerance: Decimal::ZERO,
        }
    }
}

/// Outcome of a balance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceCheck {
    /// Whether the entry satisfies the double-entry invariant.
    pub balanced: bool,
    /// Signed difference `total_debit - total_credit`.
    pub delta: Decimal,
    /// Rounded sum of debits.
    pub total_debit: Decimal,
    /// Rounded sum of credits.
    pub total_credit: Decimal,
}

/// Pure double-entry validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceValidator {
    policy: BalancePolicy,
}

impl BalanceValidator {
    /// Creates a validator with the given policy.
    #[must_use]
    pub const fn new(policy: BalancePolicy) -> Self {
        Self { policy }
    }

    /// Returns the active policy.
    #[must_use]
    pub const fn policy(&self) -> BalancePolicy {
        self.policy
    }

    /// Checks an entry.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::AmountOverflow` when a column total overflows.
    pub fn validate(&self, entry: &JournalEntry) -> Result<BalanceCheck, JournalError> {
        self.validate_lines(&entry.lines)
    }

    /// Checks a set of lines.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::AmountOverflow` when a column total overflows.
    pub fn validate_lines(&self, lines: &[JournalLine]) -> Result<BalanceCheck, JournalError> {
        let total_debit = self.round(Self::total(lines, Side::Debit)?);
        let total_credit = self.round(Self::total(lines, Side::Credit)?);
        let delta = total_debit
            .checked_sub(total_credit)
            .ok_or(JournalError::AmountOverflow { side: Side::Debit })?;

        Ok(BalanceCheck {
            balanced: delta.abs() <= self.policy.tolerance,
            delta,
            total_debit,
            total_credit,
        })
    }

    /// Checks a set of lines, turning an imbalance into an error.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::Unbalanced` when the difference exceeds the
    /// tolerance, `JournalError::AmountOverflow` when a total overflows.
    pub fn ensure_balanced(&self, lines: &[JournalLine]) -> Result<BalanceCheck, JournalError> {
        let check = self.validate_lines(lines)?;
        if check.balanced {
            Ok(check)
        } else {
            Err(JournalError::Unbalanced {
                debit: check.total_debit,
                credit: check.total_credit,
                delta: check.delta,
            })
        }
    }

    fn total(lines: &[JournalLine], side: Side) -> Result<Decimal, JournalError> {
        side_total(lines, side).ok_or(JournalError::AmountOverflow { side })
    }

    fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.policy.minor_units, RoundingStrategy::MidpointNearestEven)
    }
}
