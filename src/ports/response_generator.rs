//! Response Generator Port - external follow-up text capability.
//!
//! Produces the follow-up question the engine asks when a response falls
//! below the quality threshold. What the *next* top-level question should be
//! is the stage provider's business, not this port's.

use async_trait::async_trait;

/// Errors a generator implementation may surface.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Provider is unreachable or returned a transport-level failure.
    #[error("generator unavailable: {0}")]
    Unavailable(String),

    /// Provider produced empty or unusable text.
    #[error("generator returned unusable text: {0}")]
    UnusableText(String),
}

/// Port for generating follow-up questions.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Produces a follow-up question targeting the listed issues with the
    /// given response.
    async fn generate_followup(
        &self,
        question: &str,
        response: &str,
        issues: &[String],
    ) -> Result<String, GeneratorError>;
}
