//! CSV and spreadsheet export of journal entries.

pub mod error;
pub mod options;
pub mod pipeline;
pub mod writer;

pub use error::ExportError;
pub use options::{ExportFormat, ExportOptions, FileFormat};
pub use pipeline::{ExportFile, ExportPipeline};
pub use writer::SUMMARY_COLUMNS;
