//! Scripted evaluator, generator, and respondent for testing.
//!
//! Configurable implementations of the external-provider ports, allowing
//! the engine and orchestrator to run without a real scoring or
//! text-generation backend.
//!
//! # Example
//!
//! ```ignore
//! let evaluator = ScriptedEvaluator::new()
//!     .with_score(4.0)
//!     .with_score(8.5);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::conversation::{ConversationContext, QualityAssessment};
use crate::ports::{
    EvaluatorError, GeneratorError, QualityEvaluator, Respondent, RespondentError,
    ResponseGenerator,
};

/// A configured evaluator verdict.
#[derive(Debug, Clone)]
enum ScriptedVerdict {
    Score { score: f32, issues: Vec<String> },
    Error(String),
}

/// Scripted quality evaluator, consuming configured verdicts in order.
///
/// Once the queue is empty every response scores `fallback_score`.
#[derive(Debug, Clone)]
pub struct ScriptedEvaluator {
    verdicts: Arc<Mutex<VecDeque<ScriptedVerdict>>>,
    fallback_score: f32,
    delay: Duration,
    calls: Arc<Mutex<Vec<String>>>,
}

impl Default for ScriptedEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedEvaluator {
    pub fn new() -> Self {
        Self {
            verdicts: Arc::new(Mutex::new(VecDeque::new())),
            fallback_score: 9.0,
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a score with no issues.
    pub fn with_score(self, score: f32) -> Self {
        self.with_verdict(score, vec![])
    }

    /// Queues a score with issue text.
    pub fn with_verdict(self, score: f32, issues: Vec<String>) -> Self {
        self.verdicts
            .lock()
            .unwrap()
            .push_back(ScriptedVerdict::Score { score, issues });
        self
    }

    /// Queues a provider failure.
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.verdicts
            .lock()
            .unwrap()
            .push_back(ScriptedVerdict::Error(message.into()));
        self
    }

    /// Sets the score used once the queue is drained.
    pub fn with_fallback_score(mut self, score: f32) -> Self {
        self.fallback_score = score;
        self
    }

    /// Adds simulated latency per call, for timeout testing.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Responses evaluated so far, for verification.
    pub fn evaluated_responses(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QualityEvaluator for ScriptedEvaluator {
    async fn evaluate(
        &self,
        _question: &str,
        response: &str,
        _context: &ConversationContext,
    ) -> Result<QualityAssessment, EvaluatorError> {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        self.calls.lock().unwrap().push(response.to_string());

        let verdict = self.verdicts.lock().unwrap().pop_front();
        match verdict {
            Some(ScriptedVerdict::Score { score, issues }) => {
                QualityAssessment::with_default_threshold(score, issues, vec![])
                    .map_err(|e| EvaluatorError::MalformedVerdict(e.to_string()))
            }
            Some(ScriptedVerdict::Error(message)) => Err(EvaluatorError::Unavailable(message)),
            None => QualityAssessment::with_default_threshold(self.fallback_score, vec![], vec![])
                .map_err(|e| EvaluatorError::MalformedVerdict(e.to_string())),
        }
    }
}

/// Scripted follow-up generator.
///
/// Consumes queued follow-ups in order, then falls back to a template
/// naming the first issue.
#[derive(Debug, Clone)]
pub struct ScriptedGenerator {
    followups: Arc<Mutex<VecDeque<Result<String, String>>>>,
    delay: Duration,
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self {
            followups: Arc::new(Mutex::new(VecDeque::new())),
            delay: Duration::ZERO,
        }
    }

    /// Queues a follow-up question.
    pub fn with_followup(self, text: impl Into<String>) -> Self {
        self.followups.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    /// Queues a provider failure.
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.followups
            .lock()
            .unwrap()
            .push_back(Err(message.into()));
        self
    }

    /// Adds simulated latency per call, for timeout testing.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl ResponseGenerator for ScriptedGenerator {
    async fn generate_followup(
        &self,
        _question: &str,
        _response: &str,
        issues: &[String],
    ) -> Result<String, GeneratorError> {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let scripted = self.followups.lock().unwrap().pop_front();
        match scripted {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(GeneratorError::Unavailable(message)),
            None => match issues.first() {
                Some(issue) => Ok(format!("Could you address this: {}?", issue)),
                None => Ok("Could you say more about that?".to_string()),
            },
        }
    }
}

/// Scripted interviewee, answering from a queue.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRespondent {
    answers: Arc<Mutex<VecDeque<String>>>,
}

impl ScriptedRespondent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an answer.
    pub fn with_answer(self, text: impl Into<String>) -> Self {
        self.answers.lock().unwrap().push_back(text.into());
        self
    }

    /// Queues the same answer for every prompt of a full stage run.
    pub fn with_answers<I, S>(self, answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut queue = self.answers.lock().unwrap();
            for answer in answers {
                queue.push_back(answer.into());
            }
        }
        self
    }
}

#[async_trait]
impl Respondent for ScriptedRespondent {
    async fn reply(&self, _prompt: &str) -> Result<String, RespondentError> {
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| RespondentError::Unavailable("answer script exhausted".to_string()))
    }
}
