//! Quality Evaluator Port - external scoring capability.
//!
//! Implementations score one sanitized response against its question,
//! typically by prompting an LLM. The evaluator is pure with respect to
//! engine state: it receives the context read-only and must not mutate it.

use async_trait::async_trait;

use crate::domain::conversation::{ConversationContext, QualityAssessment};

/// Errors an evaluator implementation may surface.
#[derive(Debug, thiserror::Error)]
pub enum EvaluatorError {
    /// Provider is unreachable or returned a transport-level failure.
    #[error("evaluator unavailable: {0}")]
    Unavailable(String),

    /// Provider responded but the verdict could not be parsed.
    #[error("evaluator returned malformed verdict: {0}")]
    MalformedVerdict(String),
}

/// Port for scoring a response's quality.
#[async_trait]
pub trait QualityEvaluator: Send + Sync {
    /// Scores `response` as an answer to `question`.
    ///
    /// `context` carries the conversation so far for grading continuity;
    /// implementations must treat it as read-only.
    async fn evaluate(
        &self,
        question: &str,
        response: &str,
        context: &ConversationContext,
    ) -> Result<QualityAssessment, EvaluatorError>;
}
