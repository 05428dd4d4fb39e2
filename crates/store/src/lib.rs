//! Entry store implementations for Quire.
//!
//! This crate provides:
//! - `InMemoryEntryStore`, a concurrent in-process [`EntryStore`]
//!
//! [`EntryStore`]: quire_core::store::EntryStore

pub mod memory;

pub use memory::InMemoryEntryStore;
