//! Core engine for Quire.
//!
//! This crate contains the journal-entry lifecycle engine:
//! - Journal model and the double-entry balance validator
//! - Selection filter and entry workflow transitions
//! - Batch coordinator for submit/approve/post/reverse
//! - CSV import and CSV/spreadsheet export pipelines
//! - Result aggregation
//!
//! Storage is reached only through the [`store::EntryStore`] trait.

pub mod access;
pub mod batch;
pub mod engine;
pub mod export;
pub mod import;
pub mod journal;
pub mod report;
pub mod store;
pub mod workflow;

pub use access::{Actor, Capability};
pub use engine::{EngineSettings, JournalEngine};
