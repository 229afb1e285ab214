//! Application configuration management.

use serde::Deserialize;
use thiserror::Error;

/// Largest batch the ledger accepts in a single call.
pub const BATCH_MAX_CEILING: usize = 8189;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// The layered sources could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    Source(#[from] config::ConfigError),

    /// A value was read but is outside its allowed range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Ledger processing configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

/// Ledger processing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Maximum number of events accepted in one batch.
    #[serde(default = "default_batch_max")]
    pub batch_max: usize,
    /// Whether balance snapshots are recorded for `history` accounts.
    #[serde(default = "default_history_enabled")]
    pub history_enabled: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            batch_max: default_batch_max(),
            history_enabled: default_history_enabled(),
        }
    }
}

impl LedgerConfig {
    /// Checks that every value is within its allowed range.
    ///
    /// # Errors
    ///
    /// Returns `ConfigLoadError::Invalid` if `batch_max` is zero or above
    /// [`BATCH_MAX_CEILING`].
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.batch_max == 0 || self.batch_max > BATCH_MAX_CEILING {
            return Err(ConfigLoadError::Invalid(format!(
                "ledger.batch_max must be between 1 and {BATCH_MAX_CEILING}, got {}",
                self.batch_max
            )));
        }
        Ok(())
    }
}

fn default_batch_max() -> usize {
    BATCH_MAX_CEILING
}

fn default_history_enabled() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_log_filter() -> String {
    "tally=info".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or is out of range.
    pub fn load() -> Result<Self, ConfigLoadError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("TALLY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.ledger.validate()?;
        Ok(config)
    }
}
