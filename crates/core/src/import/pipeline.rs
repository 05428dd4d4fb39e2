//! Import pipeline: CSV text in, drafts in the store, a report out.
//!
//! Candidate entries are assembled and validated in parallel on the rayon
//! pool, off the async runtime, then created one at a time in file order so
//! the store sees a deterministic sequence.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::pin::pin;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use futures::channel::oneshot;
use futures::future::{Either, select};
use rayon::prelude::*;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use quire_shared::types::UserId;

use super::error::ImportError;
use super::options::ImportOptions;
use super::parser::{ImportUnit, RawRow, RowGroup, group_rows, parse_rows};
use crate::access::{Actor, Capability};
use crate::journal::{
    BalanceValidator, EntryAudit, EntryStatus, JournalLine, NewJournalEntry, validate_lines,
};
use crate::report::{
    FailureKind, ItemFailure, ItemRef, OperationResult, Outcome, Processed, aggregate,
    aggregate_cancelled,
};
use crate::store::{EntryStore, StoreError};

/// Settings shared by every import run.
#[derive(Debug, Clone)]
pub struct ImportSettings {
    /// Balance rules for `validateBalances` and minor-unit precision.
    pub validator: BalanceValidator,
    /// Date format used when the options name none.
    pub default_date_format: String,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            validator: BalanceValidator::default(),
            default_date_format: "%Y-%m-%d".to_string(),
        }
    }
}

/// A unit after validation, ready to be written or already settled.
#[derive(Debug)]
enum Prepared {
    Ready(ItemRef, NewJournalEntry),
    Settled(Outcome),
}

/// Per-run values every unit needs while being assembled.
struct AssembleContext {
    options: ImportOptions,
    date_format: String,
    validator: BalanceValidator,
    actor: UserId,
    at: DateTime<Utc>,
}

/// Imports CSV text as journal entries.
pub struct ImportPipeline<S> {
    store: Arc<S>,
    settings: ImportSettings,
}

impl<S: EntryStore> ImportPipeline<S> {
    /// Creates a pipeline over a store.
    pub fn new(store: Arc<S>, settings: ImportSettings) -> Self {
        Self { store, settings }
    }

    /// Runs an import.
    ///
    /// Malformed rows fail only the entry they belong to; the run always
    /// reports. A store outage after at least one entry was created stops the
    /// run and marks every remaining entry as a store failure.
    ///
    /// # Errors
    ///
    /// Returns an [`ImportError`] when the caller lacks the capability, the
    /// CSV cannot be read, validation dies, or the store is down before
    /// anything was created.
    pub async fn run(
        &self,
        actor: &Actor,
        csv_text: &str,
        options: &ImportOptions,
        cancel: &CancellationToken,
    ) -> Result<OperationResult, ImportError> {
        if !actor.can(Capability::Import) {
            warn!(actor = %actor.id, "Import rejected: missing capability");
            return Err(ImportError::Forbidden);
        }

        let rows = parse_rows(csv_text, options.skip_header_row)?;
        let row_count = rows.len();
        let units = group_rows(rows);
        debug!(rows = row_count, units = units.len(), "Import parsed");

        let context = AssembleContext {
            options: options.clone(),
            date_format: options
                .date_format
                .clone()
                .unwrap_or_else(|| self.settings.default_date_format.clone()),
            validator: self.settings.validator,
            actor: actor.id,
            at: Utc::now(),
        };

        let finished = spawn_prepare(units, context);
        let prepared = match select(finished, pin!(cancel.cancelled())).await {
            Either::Left((Ok(Ok(prepared)), _)) => prepared,
            Either::Left((Ok(Err(payload)), _)) => {
                let message = panic_message(&*payload);
                error!(error = %message, "Import validation panicked");
                return Err(ImportError::Worker(message));
            }
            Either::Left((Err(oneshot::Canceled), _)) => {
                error!("Import validation worker went away");
                return Err(ImportError::Worker("validation worker went away".to_string()));
            }
            Either::Right(_) => {
                info!(actor = %actor.id, rows = row_count, "Import cancelled during validation");
                return Ok(aggregate_cancelled(Vec::new()));
            }
        };

        let result = self.create_all(prepared, cancel).await?;
        info!(
            actor = %actor.id,
            rows = row_count,
            total = result.summary.total,
            successful = result.summary.successful,
            failed = result.summary.failed,
            cancelled = result.cancelled,
            "Import completed"
        );
        Ok(result)
    }

    async fn create_all(
        &self,
        prepared: Vec<Prepared>,
        cancel: &CancellationToken,
    ) -> Result<OperationResult, ImportError> {
        let mut outcomes = Vec::with_capacity(prepared.len());
        let mut created = 0usize;
        let mut cancelled = false;
        let mut outage: Option<String> = None;
        let mut remaining = prepared.into_iter();

        for unit in remaining.by_ref() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let (item, entry) = match unit {
                Prepared::Settled(outcome) => {
                    outcomes.push(outcome);
                    continue;
                }
                Prepared::Ready(item, entry) => (item, entry),
            };

            let status = entry.status;
            match self.store.create(entry).await {
                Ok(entry_id) => {
                    created += 1;
                    outcomes.push(Outcome::success(
                        item,
                        Processed {
                            entry_id,
                            status,
                            companion_id: None,
                        },
                    ));
                }
                Err(StoreError::Unavailable(message)) if created == 0 => {
                    error!(error = %message, "Entry store unavailable, import aborted");
                    return Err(ImportError::StoreUnavailable(message));
                }
                Err(err @ StoreError::Unavailable(_)) => {
                    error!(error = %err, created, "Entry store unavailable, import stopped");
                    outage = Some(err.to_string());
                    outcomes.push(Outcome::failure(item, err.into()));
                    break;
                }
                Err(err) => {
                    warn!(item = %item, error = %err, "Import entry rejected by store");
                    outcomes.push(Outcome::failure(item, err.into()));
                }
            }
        }

        if let Some(message) = outage {
            outcomes.extend(remaining.map(|unit| match unit {
                Prepared::Settled(outcome) => outcome,
                Prepared::Ready(item, _) => Outcome::failure(
                    item,
                    ItemFailure::new(
                        FailureKind::Store,
                        "NOT_IMPORTED",
                        format!("Not imported: {message}"),
                    ),
                ),
            }));
        }

        Ok(if cancelled {
            aggregate_cancelled(outcomes)
        } else {
            aggregate(outcomes)
        })
    }
}

/// Validates every unit on the rayon pool and sends the results back.
///
/// A panic inside validation is caught and delivered as the payload.
fn spawn_prepare(
    units: Vec<ImportUnit>,
    context: AssembleContext,
) -> oneshot::Receiver<std::thread::Result<Vec<Prepared>>> {
    let (tx, rx) = oneshot::channel();
    rayon::spawn(move || {
        let prepared = panic::catch_unwind(AssertUnwindSafe(|| {
            units
                .into_par_iter()
                .map(|unit| prepare(unit, &context))
                .collect::<Vec<_>>()
        }));
        // The receiver is gone when the import was cancelled.
        let _ = tx.send(prepared);
    });
    rx
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

fn prepare(unit: ImportUnit, context: &AssembleContext) -> Prepared {
    match unit {
        ImportUnit::Orphan(row) => Prepared::Settled(Outcome::failure(
            ItemRef::Row { row: row.line },
            ItemFailure::validation(
                "MISSING_REFERENCE",
                format!("Row {}: reference is required", row.line),
            ),
        )),
        ImportUnit::Group(group) => {
            let item = ItemRef::Group {
                reference: group.reference.clone(),
                rows: group.lines(),
            };
            match assemble(&group, context) {
                Ok(entry) => Prepared::Ready(item, entry),
                Err(failure) => Prepared::Settled(Outcome::failure(item, failure)),
            }
        }
    }
}

/// Builds and validates the entry for one row group.
fn assemble(
    group: &RowGroup,
    context: &AssembleContext,
) -> Result<NewJournalEntry, ItemFailure> {
    let first_line = group.rows.first().map_or(0, |r| r.line);
    let date = NaiveDate::parse_from_str(&group.date, &context.date_format).map_err(|_| {
        ItemFailure::validation(
            "INVALID_DATE",
            format!(
                "Row {first_line}: date '{}' does not match format '{}'",
                group.date, context.date_format
            ),
        )
    })?;

    let lines = group
        .rows
        .iter()
        .map(parse_line)
        .collect::<Result<Vec<_>, _>>()?;

    validate_lines(&lines, context.validator.policy().minor_units)?;
    if context.options.validate_balances {
        context.validator.ensure_balanced(&lines)?;
    }

    let status = context.options.initial_status();
    let audit = if status == EntryStatus::PendingApproval {
        EntryAudit {
            submitted_by: Some(context.actor),
            submitted_at: Some(context.at),
            ..EntryAudit::default()
        }
    } else {
        EntryAudit::default()
    };

    Ok(NewJournalEntry {
        reference: group.reference.clone(),
        memo: group
            .rows
            .iter()
            .map(|r| r.memo.as_str())
            .find(|m| !m.is_empty())
            .unwrap_or_default()
            .to_string(),
        kind: context.options.entry_kind,
        status,
        date,
        lines,
        audit,
    })
}

fn parse_line(row: &RawRow) -> Result<JournalLine, ItemFailure> {
    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
    Ok(JournalLine {
        account_code: row.account_code.clone(),
        debit: parse_amount(&row.debit, "debit", row.line)?,
        credit: parse_amount(&row.credit, "credit", row.line)?,
        department: non_empty(&row.department),
        project: non_empty(&row.project),
    })
}

fn parse_amount(text: &str, column: &str, line: u64) -> Result<Decimal, ItemFailure> {
    if text.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(text).map_err(|_| {
        ItemFailure::validation(
            "INVALID_AMOUNT",
            format!("Row {line}: {column} '{text}' is not a valid amount"),
        )
    })
}
