//! Engine configuration management.

use serde::Deserialize;

/// Engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Posting behavior configuration.
    #[serde(default)]
    pub posting: PostingConfig,
    /// Costing behavior configuration.
    #[serde(default)]
    pub costing: CostingConfig,
}

/// Posting behavior configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PostingConfig {
    /// Maximum automatic retries on optimistic-lock conflicts.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base backoff between retries, in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_backoff_ms() -> u64 {
    10
}

impl Default for PostingConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Costing behavior configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CostingConfig {
    /// Cost method applied to organizations that do not choose one
    /// explicitly: `weighted_average` or `fifo_batch`.
    #[serde(default = "default_cost_method")]
    pub default_method: String,
}

fn default_cost_method() -> String {
    "weighted_average".to_string()
}

impl Default for CostingConfig {
    fn default() -> Self {
        Self {
            default_method: default_cost_method(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later overriding earlier: `config/default.toml`,
    /// `config/{RUN_MODE}.toml`, environment variables prefixed `MERX`
    /// (e.g. `MERX__POSTING__MAX_RETRIES`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or deserialized.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("MERX").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
