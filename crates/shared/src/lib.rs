//! Shared types, errors, and configuration for Quire.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for journal entries and actors
//! - Application-wide error type returned by every operation entry point
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    AppConfig, ApprovalMode, EngineConfig, ImportConfig, LogConfig, ReversalDateMode, ServerConfig,
};
pub use error::{AppError, AppResult};
