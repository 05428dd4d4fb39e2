//! Export pipeline: filter, order, serialize.

use std::sync::Arc;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::error::ExportError;
use super::options::ExportOptions;
use super::writer::write_entries;
use crate::access::{Actor, Capability};
use crate::store::EntryStore;

/// A finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// File contents.
    pub bytes: Bytes,
    /// Suggested download name.
    pub filename: String,
    /// MIME type.
    pub content_type: &'static str,
    /// Entries included.
    pub entry_count: usize,
    /// Data rows written.
    pub row_count: usize,
    /// True if cancellation cut the file short.
    pub truncated: bool,
}

/// Exports journal entries as CSV.
pub struct ExportPipeline<S> {
    store: Arc<S>,
}

impl<S: EntryStore> ExportPipeline<S> {
    /// Creates a pipeline over a store.
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Runs an export.
    ///
    /// Rows are ordered by date, then reference, then entry id.
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError`] for a missing capability, an inverted date
    /// range or an unreachable store.
    pub async fn run(
        &self,
        actor: &Actor,
        options: &ExportOptions,
        cancel: &CancellationToken,
    ) -> Result<ExportFile, ExportError> {
        if !actor.can(Capability::Export) {
            warn!(actor = %actor.id, "Export rejected: missing capability");
            return Err(ExportError::Forbidden);
        }
        options.validate()?;

        let mut entries = self.store.query(&options.filter()).await.map_err(|e| {
            error!(error = %e, "Failed to query entries for export");
            ExportError::StoreUnavailable(e.to_string())
        })?;
        entries.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.reference.cmp(&b.reference))
                .then_with(|| a.id.cmp(&b.id))
        });

        let written = write_entries(&entries, options.format, options.file_format, cancel)?;

        info!(
            actor = %actor.id,
            format = %options.format,
            entries = written.entries,
            rows = written.rows,
            truncated = written.truncated,
            "Export completed"
        );

        Ok(ExportFile {
            bytes: Bytes::from(written.bytes),
            filename: options.filename(),
            content_type: options.file_format.content_type(),
            entry_count: written.entries,
            row_count: written.rows,
            truncated: written.truncated,
        })
    }
}
