//! Summarizes per-item outcomes into an [`OperationResult`].

use super::types::{ItemError, ItemSuccess, OperationResult, Outcome, Summary};

/// Aggregates outcomes, preserving their order.
#[must_use]
pub fn aggregate(outcomes: impl IntoIterator<Item = Outcome>) -> OperationResult {
    let mut summary = Summary::default();
    let mut errors = Vec::new();
    let mut successes = Vec::new();

    for outcome in outcomes {
        summary.total += 1;
        match outcome.result {
            Ok(processed) => {
                summary.successful += 1;
                successes.push(ItemSuccess {
                    item: outcome.item,
                    processed,
                });
            }
            Err(failure) => {
                summary.failed += 1;
                errors.push(ItemError {
                    item: outcome.item,
                    kind: failure.kind,
                    code: failure.code,
                    message: failure.message,
                });
            }
        }
    }

    OperationResult {
        summary,
        errors,
        successes,
        cancelled: false,
    }
}

/// Aggregates outcomes of an operation that stopped early.
#[must_use]
pub fn aggregate_cancelled(outcomes: impl IntoIterator<Item = Outcome>) -> OperationResult {
    OperationResult {
        cancelled: true,
        ..aggregate(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::EntryStatus;
    use crate::report::types::{FailureKind, ItemFailure, ItemRef, Processed};
    use quire_shared::types::EntryId;

    fn ok(id: EntryId) -> Outcome {
        Outcome::success(
            ItemRef::entry(id),
            Processed {
                entry_id: id,
                status: EntryStatus::Posted,
                companion_id: None,
            },
        )
    }

    fn failed(id: EntryId, message: &str) -> Outcome {
        Outcome::failure(
            ItemRef::entry(id),
            ItemFailure::validation("UNBALANCED_ENTRY", message),
        )
    }

    #[test]
    fn test_empty() {
        let result = aggregate(Vec::new());
        assert_eq!(result.summary, Summary::default());
        assert!(result.is_complete_success());
    }

    #[test]
    fn test_counts_and_order() {
        let (a, b, c) = (EntryId::new(), EntryId::new(), EntryId::new());
        let result = aggregate(vec![failed(c, "third"), ok(a), failed(b, "second")]);

        assert_eq!(
            result.summary,
            Summary {
                total: 3,
                successful: 1,
                failed: 2
            }
        );
        assert_eq!(result.failed_entry_ids(), vec![c, b]);
        assert_eq!(result.errors[0].message, "third");
        assert_eq!(result.errors[0].kind, FailureKind::Validation);
        assert!(!result.is_complete_success());
    }

    #[test]
    fn test_cancelled_flag() {
        let result = aggregate_cancelled(vec![ok(EntryId::new())]);
        assert!(result.cancelled);
        assert_eq!(result.summary.successful, 1);
        assert!(!result.is_complete_success());
    }

    #[test]
    fn test_error_serializes_with_entry_id() {
        let id = EntryId::new();
        let result = aggregate(vec![failed(id, "Entry is not balanced")]);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["summary"]["total"], 1);
        assert_eq!(json["errors"][0]["entryId"], id.to_string());
        assert_eq!(json["errors"][0]["kind"], "VALIDATION");
        assert_eq!(json["errors"][0]["message"], "Entry is not balanced");
    }

    #[test]
    fn test_group_ref_serializes_rows() {
        let result = aggregate(vec![Outcome::failure(
            ItemRef::Group {
                reference: "JE-7".to_string(),
                rows: vec![4, 5],
            },
            ItemFailure::validation("INVALID_AMOUNT", "row 4: debit 'abc' is not a number"),
        )]);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["errors"][0]["reference"], "JE-7");
        assert_eq!(json["errors"][0]["rows"][1], 5);
    }

    #[test]
    fn test_entry_success_serializes_single_entry_id() {
        let id = EntryId::new();
        let result = aggregate(vec![ok(id)]);
        let json = serde_json::to_string(&result).unwrap();

        assert_eq!(json.matches("\"entryId\"").count(), 1);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["successes"][0]["entryId"], id.to_string());
    }
}
