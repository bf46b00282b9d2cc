//! ConversationContext entity.
//!
//! Holds one question's conversation history and retry state. Created per
//! question and discarded once the question is accepted or escalated; the
//! terminal history is folded into the owning stage deliverable.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SessionId, Stage, StateMachine, Timestamp, ValidationError};

use super::message::{Message, MessageRole};

/// Default retry budget per question.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// State of one question's turn machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    AwaitingQuestion,
    AwaitingResponse,
    FollowUpIssued,
    Accepted,
    Escalated,
}

impl TurnState {
    /// Returns true if no further responses will be processed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnState::Accepted | TurnState::Escalated)
    }
}

impl StateMachine for TurnState {
    fn can_transition_to(&self, target: &TurnState) -> bool {
        use TurnState::*;
        matches!(
            (self, target),
            (AwaitingQuestion, AwaitingResponse)
                | (AwaitingResponse, Accepted)
                | (AwaitingResponse, FollowUpIssued)
                | (AwaitingResponse, Escalated)
                | (FollowUpIssued, AwaitingResponse)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use TurnState::*;
        match self {
            AwaitingQuestion => vec![AwaitingResponse],
            AwaitingResponse => vec![Accepted, FollowUpIssued, Escalated],
            FollowUpIssued => vec![AwaitingResponse],
            Accepted => vec![],
            Escalated => vec![],
        }
    }
}

/// Per-question conversation history and retry state.
///
/// # Invariants
///
/// - `attempt_count <= max_attempts`
/// - messages are append-only and chronologically ordered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    session_id: SessionId,
    stage: Stage,
    question: Option<String>,
    messages: Vec<Message>,
    attempt_count: u32,
    max_attempts: u32,
    state: TurnState,
    started_at: Timestamp,
}

impl ConversationContext {
    /// Creates a fresh context for one question with the default retry budget.
    pub fn new(session_id: SessionId, stage: Stage) -> Self {
        Self::with_max_attempts(session_id, stage, DEFAULT_MAX_ATTEMPTS)
    }

    /// Creates a fresh context with an explicit retry budget.
    pub fn with_max_attempts(session_id: SessionId, stage: Stage, max_attempts: u32) -> Self {
        Self {
            session_id,
            stage,
            question: None,
            messages: Vec::new(),
            attempt_count: 0,
            max_attempts: max_attempts.max(1),
            state: TurnState::AwaitingQuestion,
            started_at: Timestamp::now(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    /// Returns the owning session id.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Returns the stage this question belongs to.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Returns the question under discussion, once asked.
    pub fn question(&self) -> Option<&str> {
        self.question.as_deref()
    }

    /// Returns the full message history.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns how many responses have been evaluated.
    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    /// Returns the retry budget.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the current turn state.
    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Returns when this question was opened.
    pub fn started_at(&self) -> &Timestamp {
        &self.started_at
    }

    /// Returns the most recent user response, if any.
    pub fn last_user_response(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }

    /// Returns true if another failed evaluation may still issue a follow-up.
    pub fn attempts_remaining(&self) -> bool {
        self.attempt_count < self.max_attempts
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutations (engine-driven)
    // ─────────────────────────────────────────────────────────────────────

    /// Records the question and opens the response window.
    pub(crate) fn open_question(&mut self, question: String) -> Result<(), ValidationError> {
        self.state = self.state.transition_to(TurnState::AwaitingResponse)?;
        self.messages.push(Message::assistant(question.clone()));
        self.question = Some(question);
        Ok(())
    }

    /// Appends a user response and consumes one attempt.
    ///
    /// The bound holds by construction: responses are only appended while
    /// attempts remain, so `attempt_count` can never exceed `max_attempts`.
    pub(crate) fn record_response(&mut self, response: String) -> Result<(), ValidationError> {
        if self.state != TurnState::AwaitingResponse {
            return Err(ValidationError::invalid_format(
                "turn_state",
                format!("Cannot record a response while {:?}", self.state),
            ));
        }
        if !self.attempts_remaining() {
            return Err(ValidationError::out_of_range(
                "attempt_count",
                0.0,
                self.max_attempts as f64,
                (self.attempt_count + 1) as f64,
            ));
        }
        self.messages.push(Message::user(response));
        self.attempt_count += 1;
        Ok(())
    }

    /// Appends a follow-up question and re-opens the response window.
    pub(crate) fn issue_followup(&mut self, followup: String) -> Result<(), ValidationError> {
        self.state = self.state.transition_to(TurnState::FollowUpIssued)?;
        self.messages.push(Message::assistant(followup));
        // Implicit re-entry: the caller's next input is a fresh response.
        self.state = self.state.transition_to(TurnState::AwaitingResponse)?;
        Ok(())
    }

    /// Marks the question accepted.
    pub(crate) fn mark_accepted(&mut self) -> Result<(), ValidationError> {
        self.state = self.state.transition_to(TurnState::Accepted)?;
        Ok(())
    }

    /// Marks the question escalated.
    pub(crate) fn mark_escalated(&mut self) -> Result<(), ValidationError> {
        self.state = self.state.transition_to(TurnState::Escalated)?;
        Ok(())
    }

    /// Consumes the context, yielding its history for folding into the
    /// owning deliverable. Only valid in a terminal state.
    pub fn into_transcript(self) -> Vec<Message> {
        debug_assert!(self.state.is_terminal());
        self.messages
    }
}
