//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(#[from] config::ConfigError),
}

/// Errors raised by semantic validation of loaded configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("quality_threshold must be within [0, 10], got {0}")]
    ThresholdOutOfRange(f32),

    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),

    #[error("checkpoint_dir must not be empty")]
    EmptyCheckpointDir,
}
