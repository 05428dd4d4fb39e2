//! Application configuration management.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Batch engine configuration.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Import configuration.
    #[serde(default)]
    pub import: ImportConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted request body in bytes (CSV uploads).
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

/// What approving a pending entry does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalMode {
    /// Pending entries become `APPROVED` and are posted by a later post batch.
    #[default]
    Stage,
    /// Pending entries are balance-checked and posted on approval.
    Post,
}

/// Which accounting date a reversing entry carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReversalDateMode {
    /// Same accounting date as the original entry.
    #[default]
    Original,
    /// The date the reversal runs (UTC).
    Today,
    /// `engine.reversal_fixed_date`.
    Fixed,
}

/// Batch engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Upper bound on entries processed concurrently within one batch.
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,
    /// Minor-unit precision of the ledger currency (2 for cents).
    #[serde(default = "default_minor_units")]
    pub minor_units: u32,
    /// Largest absolute debit/credit difference still treated as balanced.
    #[serde(default)]
    pub balance_tolerance: Decimal,
    /// Approval behaviour.
    #[serde(default)]
    pub approval_mode: ApprovalMode,
    /// Whether drafts may be posted without passing approval.
    #[serde(default = "default_allow_draft_posting")]
    pub allow_draft_posting: bool,
    /// Date policy for reversing entries.
    #[serde(default)]
    pub reversal_date: ReversalDateMode,
    /// Date used when `reversal_date = "fixed"`.
    #[serde(default)]
    pub reversal_fixed_date: Option<NaiveDate>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_concurrency: default_batch_concurrency(),
            minor_units: default_minor_units(),
            balance_tolerance: Decimal::ZERO,
            approval_mode: ApprovalMode::default(),
            allow_draft_posting: default_allow_draft_posting(),
            reversal_date: ReversalDateMode::default(),
            reversal_fixed_date: None,
        }
    }
}

fn default_batch_concurrency() -> usize {
    8
}

fn default_minor_units() -> u32 {
    2
}

fn default_allow_draft_posting() -> bool {
    true
}

/// Import configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// chrono format string used when a request does not name one.
    #[serde(default = "default_date_format")]
    pub default_date_format: String,
    /// CSV file imported into the store at startup.
    #[serde(default)]
    pub seed_path: Option<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            default_date_format: default_date_format(),
            seed_path: None,
        }
    }
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    /// Emit JSON log lines instead of the human-readable format.
    #[serde(default)]
    pub json: bool,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("QUIRE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.engine.batch_concurrency, 8);
        assert_eq!(config.engine.minor_units, 2);
        assert_eq!(config.engine.balance_tolerance, Decimal::ZERO);
        assert_eq!(config.engine.approval_mode, ApprovalMode::Stage);
        assert!(config.engine.allow_draft_posting);
        assert_eq!(config.engine.reversal_date, ReversalDateMode::Original);
        assert_eq!(config.import.default_date_format, "%Y-%m-%d");
        assert!(!config.log.json);
    }

    #[test]
    fn test_load_without_sources_uses_defaults() {
        temp_env::with_vars_unset(
            [
                "QUIRE__ENGINE__BATCH_CONCURRENCY",
                "QUIRE__ENGINE__APPROVAL_MODE",
                "QUIRE__SERVER__PORT",
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.engine.batch_concurrency, 8);
                assert_eq!(config.server.port, 8080);
            },
        );
    }

    #[test]
    fn test_load_env_overrides() {
        temp_env::with_vars(
            [
                ("QUIRE__ENGINE__BATCH_CONCURRENCY", Some("16")),
                ("QUIRE__ENGINE__APPROVAL_MODE", Some("post")),
                ("QUIRE__SERVER__PORT", Some("9090")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.engine.batch_concurrency, 16);
                assert_eq!(config.engine.approval_mode, ApprovalMode::Post);
                assert_eq!(config.server.port, 9090);
            },
        );
    }
}
