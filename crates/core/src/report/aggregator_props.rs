//! Property-based tests for the result aggregator.

use proptest::prelude::*;

use quire_shared::types::EntryId;
use uuid::Uuid;

use super::aggregator::aggregate;
use super::types::{ItemFailure, ItemRef, Outcome, Processed};
use crate::journal::EntryStatus;

fn arb_outcome() -> impl Strategy<Value = Outcome> {
    (any::<u128>(), any::<bool>()).prop_map(|(raw, success)| {
        let id = EntryId::from_uuid(Uuid::from_u128(raw));
        if success {
            Outcome::success(
                ItemRef::entry(id),
                Processed {
                    entry_id: id,
                    status: EntryStatus::Posted,
                    companion_id: None,
                },
            )
        } else {
            Outcome::failure(
                ItemRef::entry(id),
                ItemFailure::conflict("INVALID_STATUS", id.to_string()),
            )
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every outcome is counted exactly once.
    #[test]
    fn prop_counts_add_up(outcomes in prop::collection::vec(arb_outcome(), 0..50)) {
        let expected_failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        let result = aggregate(outcomes.clone());

        prop_assert_eq!(result.summary.total, outcomes.len());
        prop_assert_eq!(result.summary.failed, expected_failed);
        prop_assert_eq!(result.summary.successful + result.summary.failed, result.summary.total);
        prop_assert_eq!(result.errors.len(), expected_failed);
    }

    /// Errors keep the order of the input outcomes.
    #[test]
    fn prop_error_order_preserved(outcomes in prop::collection::vec(arb_outcome(), 0..50)) {
        let expected: Vec<EntryId> = outcomes
            .iter()
            .filter(|o| o.result.is_err())
            .filter_map(|o| o.item.entry_id())
            .collect();

        prop_assert_eq!(aggregate(outcomes).failed_entry_ids(), expected);
    }
}
