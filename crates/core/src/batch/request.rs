//! Batch requests.

use serde::{Deserialize, Serialize};

use quire_shared::types::EntryId;

use super::error::BatchError;
use crate::workflow::BatchOperation;

/// An operation over an explicitly selected set of entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    /// The operation.
    pub operation: BatchOperation,
    /// Selected entries, processed in this order.
    pub entry_ids: Vec<EntryId>,
    /// Approver comments.
    #[serde(default)]
    pub comments: Option<String>,
    /// Reversal reason; required for `reverse`.
    #[serde(default)]
    pub reason: Option<String>,
}

impl BatchRequest {
    fn new(operation: BatchOperation, entry_ids: Vec<EntryId>) -> Self {
        Self {
            operation,
            entry_ids,
            comments: None,
            reason: None,
        }
    }

    /// Submit drafts for approval.
    #[must_use]
    pub fn submit(entry_ids: Vec<EntryId>) -> Self {
        Self::new(BatchOperation::Submit, entry_ids)
    }

    /// Approve pending entries.
    #[must_use]
    pub fn approve(entry_ids: Vec<EntryId>, comments: Option<String>) -> Self {
        Self {
            comments,
            ..Self::new(BatchOperation::Approve, entry_ids)
        }
    }

    /// Post entries.
    #[must_use]
    pub fn post(entry_ids: Vec<EntryId>) -> Self {
        Self::new(BatchOperation::Post, entry_ids)
    }

    /// Reverse posted entries.
    #[must_use]
    pub fn reverse(entry_ids: Vec<EntryId>, reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::new(BatchOperation::Reverse, entry_ids)
        }
    }

    /// Checks request-level rules.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::EmptySelection` for an empty id list and
    /// `BatchError::ReversalReasonRequired` for a reverse without a reason.
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.entry_ids.is_empty() {
            return Err(BatchError::EmptySelection);
        }
        if self.operation == BatchOperation::Reverse
            && self.reason.as_deref().is_none_or(|r| r.trim().is_empty())
        {
            return Err(BatchError::ReversalReasonRequired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection() {
        assert_eq!(
            BatchRequest::post(vec![]).validate(),
            Err(BatchError::EmptySelection)
        );
    }

    #[test]
    fn test_reverse_requires_reason() {
        let ids = vec![EntryId::new()];
        assert_eq!(
            BatchRequest::reverse(ids.clone(), "  ").validate(),
            Err(BatchError::ReversalReasonRequired)
        );
        let mut request = BatchRequest::reverse(ids.clone(), "x");
        request.reason = None;
        assert_eq!(request.validate(), Err(BatchError::ReversalReasonRequired));
        assert!(BatchRequest::reverse(ids, "Posted twice").validate().is_ok());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let id = EntryId::new();
        let json = format!(r#"{{"operation":"approve","entryIds":["{id}"],"comments":"ok"}}"#);
        let request: BatchRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request, BatchRequest::approve(vec![id], Some("ok".to_string())));
    }
}
