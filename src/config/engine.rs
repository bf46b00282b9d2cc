//! Conversation engine tunables.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Tunables for the quality-controlled retry loop.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Minimum score a response needs to be accepted without follow-up.
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f32,

    /// Retry budget per question.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Maximum question length; longer questions are truncated.
    #[serde(default = "default_max_question_chars")]
    pub max_question_chars: usize,

    /// Maximum response length; longer responses are rejected outright.
    #[serde(default = "default_max_response_chars")]
    pub max_response_chars: usize,

    /// Timeout for each external evaluator/generator call, in seconds.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Backoff before the single retry of a failed external call, in
    /// milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl EngineConfig {
    /// Returns the external call timeout as a Duration.
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Returns the retry backoff as a Duration.
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Validates engine configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=10.0).contains(&self.quality_threshold) {
            return Err(ValidationError::ThresholdOutOfRange(self.quality_threshold));
        }
        if self.max_attempts == 0 {
            return Err(ValidationError::ZeroAttempts);
        }
        if self.max_question_chars == 0 {
            return Err(ValidationError::ZeroLimit("max_question_chars"));
        }
        if self.max_response_chars == 0 {
            return Err(ValidationError::ZeroLimit("max_response_chars"));
        }
        if self.call_timeout_secs == 0 {
            return Err(ValidationError::ZeroLimit("call_timeout_secs"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quality_threshold: default_quality_threshold(),
            max_attempts: default_max_attempts(),
            max_question_chars: default_max_question_chars(),
            max_response_chars: default_max_response_chars(),
            call_timeout_secs: default_call_timeout_secs(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

fn default_quality_threshold() -> f32 {
    7.0
}

fn default_max_attempts() -> u32 {
    3
}

fn default_max_question_chars() -> usize {
    2_000
}

fn default_max_response_chars() -> usize {
    10_000
}

fn default_call_timeout_secs() -> u64 {
    30
}

fn default_retry_backoff_ms() -> u64 {
    500
}
