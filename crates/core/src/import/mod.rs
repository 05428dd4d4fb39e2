//! CSV import of journal entries.

pub mod error;
pub mod options;
pub mod parser;
pub mod pipeline;

pub use error::ImportError;
pub use options::ImportOptions;
pub use parser::IMPORT_COLUMNS;
pub use pipeline::{ImportPipeline, ImportSettings};
