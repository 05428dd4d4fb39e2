//! Workflow domain types.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use quire_shared::{ApprovalMode, EngineConfig, ReversalDateMode};

use crate::access::Capability;

/// A lifecycle operation applied to a selected set of entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchOperation {
    /// Draft → pending approval.
    Submit,
    /// Pending approval → approved (or posted, per [`ApprovalMode`]).
    Approve,
    /// Draft or approved → posted.
    Post,
    /// Posted → reversed, creating a mirrored companion entry.
    Reverse,
}

impl BatchOperation {
    /// All operations.
    pub const ALL: [Self; 4] = [Self::Submit, Self::Approve, Self::Post, Self::Reverse];

    /// Returns the string representation of the operation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Post => "post",
            Self::Reverse => "reverse",
        }
    }

    /// Parses an operation name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "submit" => Some(Self::Submit),
            "approve" => Some(Self::Approve),
            "post" => Some(Self::Post),
            "reverse" => Some(Self::Reverse),
            _ => None,
        }
    }

    /// Capability the caller needs to run this operation.
    #[must_use]
    pub const fn required_capability(&self) -> Capability {
        match self {
            Self::Submit => Capability::Submit,
            Self::Approve => Capability::Approve,
            Self::Post => Capability::Post,
            Self::Reverse => Capability::Reverse,
        }
    }
}

impl fmt::Display for BatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which accounting date a reversing entry carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReversalDate {
    /// The original entry's date.
    #[default]
    Original,
    /// The UTC date the reversal runs.
    Today,
    /// A fixed date.
    Fixed(NaiveDate),
}

/// Transition rules that vary by deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowPolicy {
    /// What approval does.
    pub approval_mode: ApprovalMode,
    /// Whether drafts may be posted directly.
    pub allow_draft_posting: bool,
    /// Date policy for reversing entries.
    pub reversal_date: ReversalDate,
}

impl Default for WorkflowPolicy {
    fn default() -> Self {
        Self {
            approval_mode: ApprovalMode::Stage,
            allow_draft_posting: true,
            reversal_date: ReversalDate::Original,
        }
    }
}

impl WorkflowPolicy {
    /// Builds the policy from engine configuration.
    ///
    /// Returns `None` when `reversal_date = "fixed"` has no
    /// `reversal_fixed_date`.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Option<Self> {
        let reversal_date = match config.reversal_date {
            ReversalDateMode::Original => ReversalDate::Original,
            ReversalDateMode::Today => ReversalDate::Today,
            ReversalDateMode::Fixed => ReversalDate::Fixed(config.reversal_fixed_date?),
        };

        Some(Self {
            approval_mode: config.approval_mode,
            allow_draft_posting: config.allow_draft_posting,
            reversal_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_parse() {
        for op in BatchOperation::ALL {
            assert_eq!(BatchOperation::parse(op.as_str()), Some(op));
        }
        assert_eq!(BatchOperation::parse(" APPROVE "), Some(BatchOperation::Approve));
        assert_eq!(BatchOperation::parse("void"), None);
    }

    #[test]
    fn test_required_capability() {
        assert_eq!(
            BatchOperation::Reverse.required_capability(),
            Capability::Reverse
        );
        assert_eq!(BatchOperation::Submit.required_capability(), Capability::Submit);
    }

    #[test]
    fn test_policy_from_default_config() {
        let policy = WorkflowPolicy::from_config(&EngineConfig::default()).unwrap();
        assert_eq!(policy, WorkflowPolicy::default());
    }

    #[test]
    fn test_fixed_reversal_date_requires_date() {
        let mut config = EngineConfig {
            reversal_date: ReversalDateMode::Fixed,
            ..EngineConfig::default()
        };
        assert!(WorkflowPolicy::from_config(&config).is_none());

        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        config.reversal_fixed_date = Some(date);
        assert_eq!(
            WorkflowPolicy::from_config(&config).unwrap().reversal_date,
            ReversalDate::Fixed(date)
        );
    }
}
