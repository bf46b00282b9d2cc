//! Generic stage interview driver.
//!
//! One driver serves every stage: the question provider supplies the
//! stage's question sequence, the runner pushes each question through the
//! engine's quality loop, and accepted answers accumulate into the stage
//! deliverable. Stages differ only in content, never in mechanics.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::config::EscalationPolicy;
use crate::domain::conversation::{ConversationEngine, EngineError, Message, TurnOutcome};
use crate::domain::foundation::{SessionId, Stage, ValidationError};
use crate::domain::session::{StageData, StageDeliverable};
use crate::ports::{Respondent, RespondentError, StageQuestionProvider};

/// Errors from driving a stage interview.
#[derive(Debug, Error)]
pub enum StageError {
    /// An answer escalated and policy demands human review.
    #[error("Answer for '{field}' in stage {stage:?} escalated and requires review")]
    EscalationRequiresReview { stage: Stage, field: String },

    /// The stage declared no questions, so no deliverable can be built.
    #[error("No questions declared for stage {stage:?}")]
    NoQuestions { stage: Stage },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Respondent failed: {0}")]
    Respondent(#[from] RespondentError),

    #[error("Deliverable assembly failed: {0}")]
    Deliverable(#[from] ValidationError),
}

/// Drives one stage's questions through the conversation engine.
pub struct StageRunner<'a> {
    engine: &'a ConversationEngine,
    escalation: EscalationPolicy,
}

impl<'a> StageRunner<'a> {
    pub fn new(engine: &'a ConversationEngine, escalation: EscalationPolicy) -> Self {
        Self { engine, escalation }
    }

    /// Runs a full stage interview and assembles its deliverable.
    ///
    /// Each question runs its own quality loop. Escalated answers follow
    /// the escalation policy: recorded with a flag under
    /// `AcceptBestAvailable`, aborting the run under `RequireReview`.
    pub async fn run(
        &self,
        session_id: SessionId,
        stage: Stage,
        prior_stages: &StageData,
        provider: &dyn StageQuestionProvider,
        respondent: &dyn Respondent,
    ) -> Result<StageDeliverable, StageError> {
        let questions = provider.questions(stage, prior_stages);
        if questions.is_empty() {
            return Err(StageError::NoQuestions { stage });
        }

        let mut fields: BTreeMap<String, serde_json::Value> = BTreeMap::new();
        let mut escalated_fields = BTreeSet::new();
        let mut transcript: Vec<Message> = Vec::new();

        for question in questions {
            let mut context = self.engine.new_context(session_id, stage);
            let asked = self.engine.start_turn(&mut context, &question.prompt)?;
            let mut answer = respondent.reply(&asked).await?;

            let accepted = loop {
                match self.engine.process_response(&mut context, &answer).await? {
                    TurnOutcome::Accepted { response, .. } => break response,
                    TurnOutcome::FollowUp { question } => {
                        answer = respondent.reply(&question).await?;
                    }
                    TurnOutcome::Escalated { response, .. } => match self.escalation {
                        EscalationPolicy::AcceptBestAvailable => {
                            escalated_fields.insert(question.field.clone());
                            break response;
                        }
                        EscalationPolicy::RequireReview => {
                            return Err(StageError::EscalationRequiresReview {
                                stage,
                                field: question.field,
                            });
                        }
                    },
                }
            };

            fields.insert(question.field, serde_json::Value::String(accepted));
            transcript.extend(context.into_transcript());
        }

        tracing::info!(
            session_id = %session_id,
            stage = ?stage,
            escalated = escalated_fields.len(),
            "stage interview complete"
        );
        Ok(StageDeliverable::new(
            stage,
            fields,
            escalated_fields,
            transcript,
        )?)
    }
}
