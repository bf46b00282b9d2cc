//! Conversation engine: the quality-controlled retry loop for one question.
//!
//! The engine asks a question, scores each response through the external
//! evaluator, and either accepts, asks a generated follow-up, or escalates
//! once the retry budget is spent. External calls are bounded by a timeout
//! and retried exactly once; a persistently unavailable provider degrades
//! to a low-confidence escalation instead of wedging the interview.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

use crate::config::EngineConfig;
use crate::domain::foundation::{SessionId, Stage, ValidationError};
use crate::ports::{QualityEvaluator, ResponseGenerator};

use super::context::ConversationContext;
use super::quality::QualityAssessment;
use super::sanitizer::sanitize_response;

/// Errors from engine turn processing.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// What one processed response resolved to.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The response cleared the quality threshold.
    Accepted {
        response: String,
        assessment: QualityAssessment,
    },
    /// The response fell short; ask this follow-up next.
    FollowUp { question: String },
    /// The retry budget is spent or the evaluator is unreachable.
    ///
    /// `low_confidence` marks escalations where quality was never actually
    /// assessed (provider failure), as opposed to assessed-and-rejected.
    Escalated {
        response: String,
        issues: Vec<String>,
        low_confidence: bool,
    },
}

/// Drives one question's ask/score/follow-up loop.
pub struct ConversationEngine {
    evaluator: Arc<dyn QualityEvaluator>,
    generator: Arc<dyn ResponseGenerator>,
    config: EngineConfig,
}

impl ConversationEngine {
    pub fn new(
        evaluator: Arc<dyn QualityEvaluator>,
        generator: Arc<dyn ResponseGenerator>,
        config: EngineConfig,
    ) -> Self {
        Self {
            evaluator,
            generator,
            config,
        }
    }

    /// Creates a fresh context for one question, carrying the configured
    /// retry budget.
    pub fn new_context(&self, session_id: SessionId, stage: Stage) -> ConversationContext {
        ConversationContext::with_max_attempts(session_id, stage, self.config.max_attempts)
    }

    /// Opens a question on the context, returning the text actually asked.
    ///
    /// Empty questions are rejected; overlong ones are truncated to the
    /// configured limit rather than refused, since the question comes from
    /// our own stage providers.
    pub fn start_turn(
        &self,
        context: &mut ConversationContext,
        question: &str,
    ) -> Result<String, EngineError> {
        if question.trim().is_empty() {
            return Err(ValidationError::empty_field("question").into());
        }

        let char_count = question.chars().count();
        let question = if char_count > self.config.max_question_chars {
            tracing::warn!(
                session_id = %context.session_id(),
                stage = ?context.stage(),
                chars = char_count,
                limit = self.config.max_question_chars,
                "question truncated to length limit"
            );
            question
                .chars()
                .take(self.config.max_question_chars)
                .collect()
        } else {
            question.to_string()
        };

        context.open_question(question.clone())?;
        Ok(question)
    }

    /// Processes one interviewee response through sanitize, score, and
    /// accept/follow-up/escalate.
    ///
    /// Oversized and empty responses are rejected without consuming an
    /// attempt from the retry budget.
    pub async fn process_response(
        &self,
        context: &mut ConversationContext,
        raw_response: &str,
    ) -> Result<TurnOutcome, EngineError> {
        let char_count = raw_response.chars().count();
        if char_count > self.config.max_response_chars {
            return Err(ValidationError::oversized_input(
                "response",
                self.config.max_response_chars,
                char_count,
            )
            .into());
        }
        if raw_response.trim().is_empty() {
            return Err(ValidationError::empty_field("response").into());
        }

        let sanitized = sanitize_response(raw_response);
        if sanitized.was_modified() {
            tracing::warn!(
                security = true,
                session_id = %context.session_id(),
                stage = ?context.stage(),
                patterns = ?sanitized.detected_patterns,
                "neutralized prompt-injection patterns in response"
            );
        }
        let response = sanitized.text;

        context.record_response(response.clone())?;

        let question = context.question().unwrap_or_default().to_string();
        let context_view: &ConversationContext = context;
        let assessment = match self
            .resilient("evaluate", || {
                self.evaluator.evaluate(&question, &response, context_view)
            })
            .await
        {
            Some(assessment) => assessment,
            None => {
                // Quality was never assessed; keep the answer but flag it.
                context.mark_escalated()?;
                return Ok(TurnOutcome::Escalated {
                    response,
                    issues: vec!["quality evaluation unavailable".to_string()],
                    low_confidence: true,
                });
            }
        };
        let assessment = assessment.against_threshold(self.config.quality_threshold);

        if assessment.is_acceptable() {
            tracing::debug!(
                session_id = %context.session_id(),
                score = assessment.score(),
                attempt = context.attempt_count(),
                "response accepted"
            );
            context.mark_accepted()?;
            return Ok(TurnOutcome::Accepted {
                response,
                assessment,
            });
        }

        if context.attempts_remaining() {
            let followup = self
                .resilient("generate_followup", || {
                    self.generator
                        .generate_followup(&question, &response, assessment.issues())
                })
                .await
                .filter(|text| !text.trim().is_empty());

            if let Some(followup) = followup {
                context.issue_followup(followup.clone())?;
                return Ok(TurnOutcome::FollowUp { question: followup });
            }

            // No usable follow-up text; escalate rather than stall.
            context.mark_escalated()?;
            return Ok(TurnOutcome::Escalated {
                response,
                issues: assessment.issues().to_vec(),
                low_confidence: true,
            });
        }

        tracing::info!(
            session_id = %context.session_id(),
            stage = ?context.stage(),
            attempts = context.attempt_count(),
            "retry budget exhausted, escalating"
        );
        context.mark_escalated()?;
        Ok(TurnOutcome::Escalated {
            response,
            issues: assessment.issues().to_vec(),
            low_confidence: false,
        })
    }

    /// Runs an external call with the configured timeout, retrying once
    /// after a backoff. Returns None when both attempts fail.
    async fn resilient<T, E, Fut>(&self, call: &str, mut op: impl FnMut() -> Fut) -> Option<T>
    where
        E: std::fmt::Display,
        Fut: Future<Output = Result<T, E>>,
    {
        for attempt in 0..2u32 {
            if attempt > 0 {
                tokio::time::sleep(self.config.retry_backoff()).await;
            }
            match tokio::time::timeout(self.config.call_timeout(), op()).await {
                Ok(Ok(value)) => return Some(value),
                Ok(Err(err)) => {
                    tracing::warn!(call, attempt, error = %err, "external call failed");
                }
                Err(_) => {
                    tracing::warn!(
                        call,
                        attempt,
                        timeout_secs = self.config.call_timeout_secs,
                        "external call timed out"
                    );
                }
            }
        }
        None
    }
}
