//! Stage agent ports: question supply and interviewee channel.
//!
//! A stage's interview is driven by the generic `StageRunner`; what varies
//! per stage is only the question sequence and which deliverable field each
//! answer feeds. `StageQuestionProvider` supplies exactly that.
//! `Respondent` abstracts where answers come from (a human over some
//! transport, or a script in tests) and is the one suspension point with no
//! enforced timeout.

use async_trait::async_trait;

use crate::domain::foundation::Stage;
use crate::domain::session::StageData;

/// One question a stage asks, bound to the deliverable field it fills.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageQuestion {
    /// Deliverable field the accepted answer is recorded under.
    pub field: String,
    /// The question text put to the interviewee.
    pub prompt: String,
}

impl StageQuestion {
    /// Creates a question bound to a deliverable field.
    pub fn new(field: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            prompt: prompt.into(),
        }
    }
}

/// Port supplying a stage's question sequence.
///
/// `prior_stages` carries the deliverables of every completed stage so
/// providers can tailor wording to earlier answers.
pub trait StageQuestionProvider: Send + Sync {
    /// Returns the questions for a stage, in the order they are asked.
    fn questions(&self, stage: Stage, prior_stages: &StageData) -> Vec<StageQuestion>;
}

/// Errors from the interviewee channel.
#[derive(Debug, thiserror::Error)]
pub enum RespondentError {
    /// The interviewee went away (disconnect, abandonment).
    #[error("respondent unavailable: {0}")]
    Unavailable(String),
}

/// Port delivering interviewee answers.
#[async_trait]
pub trait Respondent: Send + Sync {
    /// Obtains the interviewee's answer to a prompt.
    ///
    /// There is no enforced timeout here; fully automated callers should
    /// wrap this in their own.
    async fn reply(&self, prompt: &str) -> Result<String, RespondentError>;
}
