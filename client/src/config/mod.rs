//! Configuration management for the Form Coach client
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: FC__)
//! 4. `BACKEND_URL`, which overrides the backend base URL on its own

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

use crate::error::ClientResult;

/// Environment variable carrying the backend base URL
pub const BACKEND_URL_ENV: &str = "BACKEND_URL";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    pub backend: BackendConfig,
    #[validate(nested)]
    pub health: HealthConfig,
    pub history: HistoryConfig,
    #[validate(nested)]
    #[serde(default)]
    pub processing: ProcessingConfig,
}

/// Analysis backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BackendConfig {
    #[validate(url)]
    pub base_url: String,
}

/// Backend health polling configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HealthConfig {
    #[validate(range(min = 1))]
    pub poll_interval_secs: u64,
}

/// Local workout history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub path: PathBuf,
}

/// Processing view timings, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProcessingConfig {
    #[validate(range(min = 1))]
    pub tick_interval_ms: u64,
    #[validate(range(min = 1, max = 99))]
    pub progress_step: u8,
    #[validate(range(min = 1, max = 99))]
    pub progress_cap: u8,
    pub reward_delay_ms: u64,
    pub coins_delay_ms: u64,
    pub overlay_duration_ms: u64,
    pub retry_delay_ms: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 500,
            progress_step: 5,
            progress_cap: 90,
            reward_delay_ms: 1000,
            coins_delay_ms: 1500,
            overlay_duration_ms: 4000,
            retry_delay_ms: 2000,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: "http://localhost:8000".to_string(),
            },
            health: HealthConfig {
                poll_interval_secs: 10,
            },
            history: HistoryConfig {
                path: PathBuf::from("workout_history.json"),
            },
            processing: ProcessingConfig::default(),
        }
    }
}

impl HealthConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with FC__ prefix
    /// 4. BACKEND_URL
    pub fn load() -> ClientResult<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Load from environment-specific config file
            .add_source(config::File::with_name(&config_file).required(false))
            // Override with environment variables (FC__ prefix)
            // e.g., FC__HEALTH__POLL_INTERVAL_SECS=5 sets health.poll_interval_secs
            .add_source(
                config::Environment::with_prefix("FC")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("backend.base_url", env::var(BACKEND_URL_ENV).ok())?
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.finalize()
    }

    /// Normalise and validate a configuration built in code or loaded from sources
    pub fn finalize(mut self) -> ClientResult<Self> {
        self.backend.base_url = normalize_base_url(&self.backend.base_url);
        self.validate()?;
        Ok(self)
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }
}

/// Strip surrounding whitespace and trailing slashes so paths can be appended directly
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
