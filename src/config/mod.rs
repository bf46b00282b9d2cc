//! Application configuration.
//!
//! Loaded from environment variables with the `CHARTERFLOW__` prefix and
//! `__` as the nesting separator, e.g. `CHARTERFLOW__ENGINE__MAX_ATTEMPTS=5`.
//! A `.env` file is honored in development.

mod engine;
mod error;
mod gate;
mod storage;

pub use engine::EngineConfig;
pub use error::{ConfigError, ValidationError};
pub use gate::{EscalationPolicy, GatePolicy};
pub use storage::StorageConfig;

use config::{Config, Environment};
use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub gate: GatePolicy,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Loads configuration from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        // Best-effort: absence of a .env file is not an error.
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(
                Environment::with_prefix("CHARTERFLOW")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Validates the loaded configuration as a whole.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.engine.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}
