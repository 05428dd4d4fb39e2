//! Property-based tests for reversing entries.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::reversal::ReversalService;
use crate::journal::{BalanceValidator, JournalLine};

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_line() -> impl Strategy<Value = JournalLine> {
    (arb_amount(), any::<bool>(), "[1-9][0-9]{3}").prop_map(|(amount, debit, code)| {
        if debit {
            JournalLine::debit(code, amount)
        } else {
            JournalLine::credit(code, amount)
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Reversing twice restores the original lines.
    #[test]
    fn prop_mirror_is_involution(lines in prop::collection::vec(arb_line(), 1..20)) {
        let twice = ReversalService::mirror_lines(&ReversalService::mirror_lines(&lines));
        prop_assert_eq!(twice, lines);
    }

    /// The original and its reversal net to zero on every account.
    #[test]
    fn prop_original_plus_reversal_nets_to_zero(lines in prop::collection::vec(arb_line(), 1..20)) {
        let mut combined = lines.clone();
        combined.extend(ReversalService::mirror_lines(&lines));

        let check = BalanceValidator::default().validate_lines(&combined).unwrap();
        prop_assert!(check.balanced);
        prop_assert_eq!(check.delta, Decimal::ZERO);

        let validator = BalanceValidator::default();
        let original = validator.validate_lines(&lines).unwrap();
        let mirrored = validator.validate_lines(&ReversalService::mirror_lines(&lines)).unwrap();
        prop_assert_eq!(mirrored.delta, -original.delta);
    }
}
