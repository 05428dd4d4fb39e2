//! Structural rules every journal entry must satisfy.

use rust_decimal::Decimal;

use super::error::JournalError;
use super::types::{JournalLine, Side, side_total};

/// Validates the structure of a set of lines.
///
/// Checks, in order: at least two lines; per line a non-empty account code,
/// non-negative amounts, exactly one non-zero side and no precision finer than
/// `minor_units`; then that both a debit and a credit side exist and that
/// neither column total overflows.
/// Balance is checked separately by [`super::BalanceValidator`].
///
/// # Errors
///
/// Returns the first rule violation found.
pub fn validate_lines(lines: &[JournalLine], minor_units: u32) -> Result<(), JournalError> {
    if lines.len() < 2 {
        return Err(JournalError::InsufficientLines);
    }

    let mut has_debit = false;
    let mut has_credit = false;

    for (idx, line) in lines.iter().enumerate() {
        let number = idx + 1;

        if line.account_code.trim().is_empty() {
            return Err(JournalError::MissingAccountCode { line: number });
        }
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(JournalError::NegativeAmount { line: number });
        }

        match (line.debit.is_zero(), line.credit.is_zero()) {
            (true, true) => return Err(JournalError::ZeroLine { line: number }),
            (false, false) => return Err(JournalError::BothSides { line: number }),
            (false, true) => has_debit = true,
            (true, false) => has_credit = true,
        }

        for amount in [line.debit, line.credit] {
            if amount.normalize().scale() > minor_units {
                return Err(JournalError::ExcessPrecision {
                    line: number,
                    amount,
                    minor_units,
                });
            }
        }
    }

    if !has_debit || !has_credit {
        return Err(JournalError::SingleSided);
    }

    for side in [Side::Debit, Side::Credit] {
        if side_total(lines, side).is_none() {
            return Err(JournalError::AmountOverflow { side });
        }
    }

    Ok(())
}
