//! Batch coordinator: runs a lifecycle operation over selected entries.
//!
//! Entries are fetched once, checked and written independently, and the
//! per-entry outcomes are aggregated in request order. Writes run on a bounded
//! in-task pool; `buffered` yields completions in input order, so the result
//! never depends on scheduling.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use quire_shared::types::{EntryId, UserId};

use super::error::BatchError;
use super::request::BatchRequest;
use crate::access::Actor;
use crate::journal::{BalanceValidator, EntryStatus, JournalEntry};
use crate::report::{
    ItemFailure, ItemRef, OperationResult, Outcome, Processed, aggregate, aggregate_cancelled,
};
use crate::store::{EntryStore, StoreError, TransitionMetadata};
use crate::workflow::{BatchOperation, ReversalService, WorkflowPolicy, WorkflowService};

/// Tuning and rules for batch runs.
#[derive(Debug, Clone, Copy)]
pub struct BatchSettings {
    /// Upper bound on entries in flight at once.
    pub concurrency: usize,
    /// Transition rules.
    pub policy: WorkflowPolicy,
    /// Balance rules applied before posting.
    pub validator: BalanceValidator,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            concurrency: 8,
            policy: WorkflowPolicy::default(),
            validator: BalanceValidator::default(),
        }
    }
}

/// An entry's place in the run, decided before any write.
enum Planned {
    Settled(Outcome),
    Pending(JournalEntry),
}

/// Shared audit data for every entry in one run.
struct RunContext {
    operation: BatchOperation,
    actor: UserId,
    at: DateTime<Utc>,
    comments: Option<String>,
    reason: Option<String>,
}

impl RunContext {
    fn metadata(&self) -> TransitionMetadata {
        TransitionMetadata {
            actor: self.actor,
            at: self.at,
            comments: self.comments.clone(),
            reason: self.reason.clone(),
        }
    }
}

/// Orchestrates submit/approve/post/reverse over an explicit selection.
pub struct BatchCoordinator<S> {
    store: Arc<S>,
    settings: BatchSettings,
}

impl<S: EntryStore> BatchCoordinator<S> {
    /// Creates a coordinator over a store.
    pub fn new(store: Arc<S>, settings: BatchSettings) -> Self {
        Self { store, settings }
    }

    /// Returns the active settings.
    pub const fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    /// Runs a batch.
    ///
    /// Request-level problems (empty selection, missing reason, missing
    /// capability, unreadable store) abort before anything is written.
    /// Everything else is reported per entry. When `cancel` fires, entries not
    /// yet started are skipped and the result is marked `cancelled`.
    ///
    /// # Errors
    ///
    /// Returns a [`BatchError`] for request-level failures.
    pub async fn run(
        &self,
        actor: &Actor,
        request: BatchRequest,
        cancel: &CancellationToken,
    ) -> Result<OperationResult, BatchError> {
        request.validate()?;

        let operation = request.operation;
        let capability = operation.required_capability();
        if !actor.can(capability) {
            warn!(actor = %actor.id, operation = %operation, "Batch rejected: missing capability");
            return Err(BatchError::Forbidden {
                operation,
                capability,
            });
        }

        let plan = self.plan(&request.entry_ids).await?;
        let context = RunContext {
            operation,
            actor: actor.id,
            at: Utc::now(),
            comments: request.comments,
            reason: request.reason,
        };

        debug!(
            operation = %operation,
            total = plan.len(),
            concurrency = self.settings.concurrency,
            "Batch started"
        );

        let pending: Vec<_> = plan
            .into_iter()
            .map(|planned| self.process(planned, &context, cancel))
            .collect();
        let results: Vec<Option<Outcome>> = stream::iter(pending)
            .buffered(self.settings.concurrency.max(1))
            .collect()
            .await;

        let cancelled = results.iter().any(Option::is_none);
        let outcomes = results.into_iter().flatten();
        let result = if cancelled {
            aggregate_cancelled(outcomes)
        } else {
            aggregate(outcomes)
        };

        info!(
            operation = %operation,
            actor = %actor.id,
            total = result.summary.total,
            successful = result.summary.successful,
            failed = result.summary.failed,
            cancelled = result.cancelled,
            "Batch completed"
        );

        Ok(result)
    }

    /// Fetches the selection and settles duplicates and unknown ids.
    async fn plan(&self, entry_ids: &[EntryId]) -> Result<Vec<Planned>, BatchError> {
        let mut seen = HashSet::with_capacity(entry_ids.len());
        let unique: Vec<EntryId> = entry_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        let entries = self.store.get(&unique).await.map_err(|e| {
            error!(error = %e, "Failed to load batch selection");
            BatchError::StoreUnavailable(e.to_string())
        })?;
        let mut by_id: HashMap<EntryId, JournalEntry> =
            entries.into_iter().map(|e| (e.id, e)).collect();

        let mut seen = HashSet::with_capacity(entry_ids.len());
        let plan = entry_ids
            .iter()
            .map(|id| {
                let item = ItemRef::entry(*id);
                if !seen.insert(*id) {
                    return Planned::Settled(Outcome::failure(
                        item,
                        ItemFailure::validation(
                            "DUPLICATE_SELECTION",
                            format!("Entry {id} is selected more than once"),
                        ),
                    ));
                }
                match by_id.remove(id) {
                    Some(entry) => Planned::Pending(entry),
                    None => Planned::Settled(Outcome::failure(
                        item,
                        StoreError::NotFound(*id).into(),
                    )),
                }
            })
            .collect();

        Ok(plan)
    }

    /// Processes one planned entry; `None` means it was skipped by cancellation.
    async fn process(
        &self,
        planned: Planned,
        context: &RunContext,
        cancel: &CancellationToken,
    ) -> Option<Outcome> {
        if cancel.is_cancelled() {
            return None;
        }

        let entry = match planned {
            Planned::Settled(outcome) => return Some(outcome),
            Planned::Pending(entry) => entry,
        };
        let item = ItemRef::entry(entry.id);

        match self.apply(&entry, context).await {
            Ok(processed) => {
                debug!(
                    entry_id = %entry.id,
                    operation = %context.operation,
                    status = %processed.status,
                    "Batch item applied"
                );
                Some(Outcome::success(item, processed))
            }
            Err(failure) => {
                warn!(
                    entry_id = %entry.id,
                    operation = %context.operation,
                    code = failure.code,
                    error = %failure.message,
                    "Batch item failed"
                );
                Some(Outcome::failure(item, failure))
            }
        }
    }

    async fn apply(
        &self,
        entry: &JournalEntry,
        context: &RunContext,
    ) -> Result<Processed, ItemFailure> {
        let policy = &self.settings.policy;
        let validator = &self.settings.validator;
        let metadata = context.metadata();

        let update = match context.operation {
            BatchOperation::Reverse => {
                let write = ReversalService::build(entry, metadata, policy, validator)?;
                let companion_id = self.store.reverse(write).await?;
                return Ok(Processed {
                    entry_id: entry.id,
                    status: EntryStatus::Reversed,
                    companion_id: Some(companion_id),
                });
            }
            BatchOperation::Submit => WorkflowService::submit(entry, metadata, policy)?,
            BatchOperation::Approve => {
                WorkflowService::approve(entry, metadata, policy, validator)?
            }
            BatchOperation::Post => WorkflowService::post(entry, metadata, policy, validator)?,
        };

        let updated = self.store.update_status(update).await?;
        Ok(Processed {
            entry_id: updated.id,
            status: updated.status,
            companion_id: None,
        })
    }
}
