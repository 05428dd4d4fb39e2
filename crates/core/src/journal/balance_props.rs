//! Property-based tests for the balance validator.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::BalanceValidator;
use super::error::JournalError;
use super::types::{JournalLine, Side, side_total};

/// Strategy for minor-unit amounts from 0.01 to 1,000,000.00.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_lines() -> impl Strategy<Value = Vec<JournalLine>> {
    (
        prop::collection::vec(arb_amount(), 1..6),
        prop::collection::vec(arb_amount(), 1..6),
    )
        .prop_map(|(debits, credits)| {
            debits
                .into_iter()
                .map(|d| JournalLine::debit("1000", d))
                .chain(credits.into_iter().map(|c| JournalLine::credit("2000", c)))
                .collect()
        })
}

/// Whole amounts anywhere in the `Decimal` range.
fn arb_huge_amount() -> impl Strategy<Value = Decimal> {
    (any::<u32>(), any::<u32>(), any::<u32>())
        .prop_map(|(lo, mid, hi)| Decimal::from_parts(lo, mid, hi, false, 0))
}

fn arb_huge_lines() -> impl Strategy<Value = Vec<JournalLine>> {
    (
        prop::collection::vec(arb_huge_amount(), 1..4),
        prop::collection::vec(arb_huge_amount(), 1..4),
    )
        .prop_map(|(debits, credits)| {
            debits
                .into_iter()
                .map(|d| JournalLine::debit("1000", d))
                .chain(credits.into_iter().map(|c| JournalLine::credit("2000", c)))
                .collect()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Balanced exactly when the two column sums are equal.
    #[test]
    fn prop_balanced_iff_sums_equal(lines in arb_lines()) {
        let debit: Decimal = lines.iter().map(|l| l.debit).sum();
        let credit: Decimal = lines.iter().map(|l| l.credit).sum();

        let check = BalanceValidator::default().validate_lines(&lines).unwrap();

        prop_assert_eq!(check.balanced, debit == credit);
        prop_assert_eq!(check.delta, debit - credit);
    }

    /// Adding the missing amount to the short side always balances the entry.
    #[test]
    fn prop_topping_up_short_side_balances(mut lines in arb_lines()) {
        let check = BalanceValidator::default().validate_lines(&lines).unwrap();
        if check.delta > Decimal::ZERO {
            lines.push(JournalLine::credit("3000", check.delta));
        } else if check.delta < Decimal::ZERO {
            lines.push(JournalLine::debit("3000", -check.delta));
        }

        prop_assert!(BalanceValidator::default().validate_lines(&lines).unwrap().balanced);
    }

    /// Mirroring every line negates the delta.
    #[test]
    fn prop_mirroring_negates_delta(lines in arb_lines()) {
        let validator = BalanceValidator::default();
        let mirrored: Vec<JournalLine> = lines.iter().map(JournalLine::mirrored).collect();

        prop_assert_eq!(
            validator.validate_lines(&mirrored).unwrap().delta,
            -validator.validate_lines(&lines).unwrap().delta
        );
    }

    /// Totals past the `Decimal` range are reported, never panic.
    #[test]
    fn prop_overflow_is_reported(lines in arb_huge_lines()) {
        let result = BalanceValidator::default().validate_lines(&lines);
        match (side_total(&lines, Side::Debit), side_total(&lines, Side::Credit)) {
            (None, _) => prop_assert_eq!(
                result,
                Err(JournalError::AmountOverflow { side: Side::Debit })
            ),
            (Some(_), None) => prop_assert_eq!(
                result,
                Err(JournalError::AmountOverflow { side: Side::Credit })
            ),
            (Some(debit), Some(credit)) => {
                let check = result.unwrap();
                prop_assert_eq!(check.balanced, debit == credit);
            }
        }
    }
}
