//! The journal engine: one handle over every operation entry point.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use quire_shared::types::EntryId;
use quire_shared::{AppError, EngineConfig, ImportConfig};

use crate::access::Actor;
use crate::batch::{BatchCoordinator, BatchError, BatchRequest, BatchSettings};
use crate::export::{ExportError, ExportFile, ExportOptions, ExportPipeline};
use crate::import::{ImportError, ImportOptions, ImportPipeline, ImportSettings};
use crate::journal::{BalancePolicy, BalanceValidator, JournalEntry};
use crate::report::OperationResult;
use crate::store::{EntryFilter, EntryStore, StoreError};
use crate::workflow::{BatchOperation, SelectionFilter, WorkflowPolicy};

/// Settings for every pipeline, derived from configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    /// Batch coordinator settings.
    pub batch: BatchSettings,
    /// Import pipeline settings.
    pub import: ImportSettings,
}

impl EngineSettings {
    /// Builds settings from the `engine` and `import` config sections.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for inconsistent configuration.
    pub fn from_config(engine: &EngineConfig, import: &ImportConfig) -> Result<Self, AppError> {
        if engine.batch_concurrency == 0 {
            return Err(AppError::Validation(
                "engine.batch_concurrency must be at least 1".to_string(),
            ));
        }
        if engine.balance_tolerance.is_sign_negative() {
            return Err(AppError::Validation(
                "engine.balance_tolerance must not be negative".to_string(),
            ));
        }
        let policy = WorkflowPolicy::from_config(engine).ok_or_else(|| {
            AppError::Validation(
                "engine.reversal_fixed_date is required when engine.reversal_date = \"fixed\""
                    .to_string(),
            )
        })?;

        let validator = BalanceValidator::new(BalancePolicy {
            minor_units: engine.minor_units,
            tolerance: engine.balance_tolerance,
        });

        Ok(Self {
            batch: BatchSettings {
                concurrency: engine.batch_concurrency,
                policy,
                validator,
            },
            import: ImportSettings {
                validator,
                default_date_format: import.default_date_format.clone(),
            },
        })
    }
}

/// Facade over the batch coordinator and the import/export pipelines.
pub struct JournalEngine<S> {
    store: Arc<S>,
    batch: BatchCoordinator<S>,
    import: ImportPipeline<S>,
    export: ExportPipeline<S>,
}

impl<S: EntryStore> JournalEngine<S> {
    /// Creates an engine over a store.
    pub fn new(store: Arc<S>, settings: EngineSettings) -> Self {
        Self {
            batch: BatchCoordinator::new(Arc::clone(&store), settings.batch),
            import: ImportPipeline::new(Arc::clone(&store), settings.import),
            export: ExportPipeline::new(Arc::clone(&store)),
            store,
        }
    }

    /// The underlying store.
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Runs any batch request.
    pub async fn run_batch(
        &self,
        actor: &Actor,
        request: BatchRequest,
        cancel: &CancellationToken,
    ) -> Result<OperationResult, BatchError> {
        self.batch.run(actor, request, cancel).await
    }

    /// Submits drafts for approval.
    pub async fn batch_submit(
        &self,
        actor: &Actor,
        entry_ids: Vec<EntryId>,
        cancel: &CancellationToken,
    ) -> Result<OperationResult, BatchError> {
        self.run_batch(actor, BatchRequest::submit(entry_ids), cancel)
            .await
    }

    /// Approves pending entries.
    pub async fn batch_approve(
        &self,
        actor: &Actor,
        entry_ids: Vec<EntryId>,
        comments: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<OperationResult, BatchError> {
        self.run_batch(actor, BatchRequest::approve(entry_ids, comments), cancel)
            .await
    }

    /// Posts entries.
    pub async fn batch_post(
        &self,
        actor: &Actor,
        entry_ids: Vec<EntryId>,
        cancel: &CancellationToken,
    ) -> Result<OperationResult, BatchError> {
        self.run_batch(actor, BatchRequest::post(entry_ids), cancel)
            .await
    }

    /// Reverses posted entries.
    pub async fn batch_reverse(
        &self,
        actor: &Actor,
        entry_ids: Vec<EntryId>,
        reason: impl Into<String>,
        cancel: &CancellationToken,
    ) -> Result<OperationResult, BatchError> {
        self.run_batch(actor, BatchRequest::reverse(entry_ids, reason), cancel)
            .await
    }

    /// Imports CSV text.
    pub async fn import(
        &self,
        actor: &Actor,
        csv_text: &str,
        options: &ImportOptions,
        cancel: &CancellationToken,
    ) -> Result<OperationResult, ImportError> {
        self.import.run(actor, csv_text, options, cancel).await
    }

    /// Exports entries.
    pub async fn export(
        &self,
        actor: &Actor,
        options: &ExportOptions,
        cancel: &CancellationToken,
    ) -> Result<ExportFile, ExportError> {
        self.export.run(actor, options, cancel).await
    }

    /// Entries matching `filter` that `operation` may act on, ordered by
    /// date, reference and id.
    pub async fn eligible(
        &self,
        operation: BatchOperation,
        filter: &EntryFilter,
    ) -> Result<Vec<JournalEntry>, StoreError> {
        let policy = &self.batch.settings().policy;
        let mut entries: Vec<JournalEntry> = self
            .store
            .query(filter)
            .await?
            .into_iter()
            .filter(|entry| SelectionFilter::is_eligible(entry.status, operation, policy))
            .collect();
        entries.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.reference.cmp(&b.reference))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(entries)
    }
}
