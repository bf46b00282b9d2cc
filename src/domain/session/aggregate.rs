//! The Session aggregate root.
//!
//! A session walks the fixed stage pipeline in order. Deliverables are
//! recorded one stage at a time, advancement is explicit, and terminal
//! statuses freeze the aggregate. Rehydration from storage goes through
//! `reconstitute`; recovery from a durable snapshot goes through
//! `restore_from_checkpoint`, which re-verifies the snapshot's checksum.

use crate::domain::foundation::{
    SessionId, SessionStatus, Stage, StateMachine, Timestamp, UserId, ValidationError,
};

use super::checkpoint::Checkpoint;
use super::deliverable::{StageData, StageDeliverable};
use super::errors::SessionError;

const MAX_PROJECT_NAME_CHARS: usize = 200;

/// An interview session working toward a project charter.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    id: SessionId,
    user_id: UserId,
    project_name: String,
    current_stage: Stage,
    status: SessionStatus,
    stage_data: StageData,
    started_at: Timestamp,
    last_updated_at: Timestamp,
}

impl Session {
    /// Creates a new session at the first stage.
    pub fn new(user_id: UserId, project_name: impl Into<String>) -> Result<Self, SessionError> {
        let project_name = project_name.into();
        let trimmed = project_name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("project_name").into());
        }
        let char_count = trimmed.chars().count();
        if char_count > MAX_PROJECT_NAME_CHARS {
            return Err(
                ValidationError::oversized_input("project_name", MAX_PROJECT_NAME_CHARS, char_count)
                    .into(),
            );
        }

        let now = Timestamp::now();
        Ok(Self {
            id: SessionId::new(),
            user_id,
            project_name: trimmed.to_string(),
            current_stage: Stage::first(),
            status: SessionStatus::Created,
            stage_data: StageData::new(),
            started_at: now,
            last_updated_at: now,
        })
    }

    /// Rebuilds a session from persisted state. No validation is re-run;
    /// storage is trusted to hold what the aggregate once emitted.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SessionId,
        user_id: UserId,
        project_name: String,
        current_stage: Stage,
        status: SessionStatus,
        stage_data: StageData,
        started_at: Timestamp,
        last_updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            project_name,
            current_stage,
            status,
            stage_data,
            started_at,
            last_updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn current_stage(&self) -> Stage {
        self.current_stage
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn stage_data(&self) -> &StageData {
        &self.stage_data
    }

    /// The deliverable recorded for a stage, if that stage has completed.
    pub fn deliverable(&self, stage: Stage) -> Option<&StageDeliverable> {
        self.stage_data.get(&stage)
    }

    /// True when the current stage's deliverable has been recorded.
    pub fn current_stage_complete(&self) -> bool {
        self.stage_data.contains_key(&self.current_stage)
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn last_updated_at(&self) -> Timestamp {
        self.last_updated_at
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────

    /// Records the deliverable for the current stage.
    ///
    /// The first recorded deliverable moves a `Created` session to
    /// `InProgress`. Recording again for the same stage replaces the
    /// previous deliverable.
    pub fn record_deliverable(&mut self, deliverable: StageDeliverable) -> Result<(), SessionError> {
        self.ensure_mutable()?;
        if deliverable.stage() != self.current_stage {
            return Err(SessionError::StageOutOfOrder {
                expected: self.current_stage,
                requested: deliverable.stage(),
            });
        }
        if self.status == SessionStatus::Created {
            self.transition_status(SessionStatus::InProgress)?;
        }
        self.stage_data.insert(deliverable.stage(), deliverable);
        self.touch();
        Ok(())
    }

    /// Moves to the next stage.
    ///
    /// The current stage's deliverable must already be recorded. Advancing
    /// past the final stage is an error; the final stage ends with
    /// `mark_completed` instead.
    pub fn advance(&mut self) -> Result<Stage, SessionError> {
        self.ensure_mutable()?;
        if !self.current_stage_complete() {
            return Err(SessionError::StageNotComplete {
                stage: self.current_stage,
            });
        }
        let next = self
            .current_stage
            .next()
            .ok_or(SessionError::AlreadyAtFinalStage {
                session_id: self.id,
            })?;
        self.current_stage = next;
        self.touch();
        Ok(next)
    }

    /// Restores stage data and position from a verified checkpoint.
    ///
    /// The checkpoint must belong to this session and pass its integrity
    /// check. The session resumes at the stage after the checkpointed one,
    /// or at the final stage if that was the one checkpointed.
    pub fn restore_from_checkpoint(&mut self, checkpoint: &Checkpoint) -> Result<(), SessionError> {
        if checkpoint.session_id() != self.id {
            return Err(SessionError::CheckpointSessionMismatch {
                session_id: self.id,
                checkpoint_session: checkpoint.session_id(),
            });
        }
        checkpoint.verify()?;

        let completed = Stage::from_number(checkpoint.stage_number()).map_err(|_| {
            SessionError::CorruptCheckpoint {
                session_id: self.id,
                stage_number: checkpoint.stage_number(),
            }
        })?;
        self.stage_data = checkpoint.stage_data().clone();
        self.current_stage = completed.next().unwrap_or(completed);
        if self.status == SessionStatus::Created {
            self.transition_status(SessionStatus::InProgress)?;
        }
        self.touch();
        Ok(())
    }

    /// Marks the session completed. Every stage must have a deliverable.
    pub fn mark_completed(&mut self) -> Result<(), SessionError> {
        for stage in Stage::all().iter().copied() {
            if !self.stage_data.contains_key(&stage) {
                return Err(SessionError::StageNotComplete { stage });
            }
        }
        self.transition_status(SessionStatus::Completed)?;
        self.touch();
        Ok(())
    }

    /// Marks the session failed.
    pub fn mark_failed(&mut self) -> Result<(), SessionError> {
        self.transition_status(SessionStatus::Failed)?;
        self.touch();
        Ok(())
    }

    fn transition_status(&mut self, to: SessionStatus) -> Result<(), SessionError> {
        self.status =
            self.status
                .transition_to(to)
                .map_err(|_| SessionError::InvalidStatusTransition {
                    from: self.status,
                    to,
                })?;
        Ok(())
    }

    fn ensure_mutable(&self) -> Result<(), SessionError> {
        if !self.status.is_active() {
            return Err(SessionError::NotModifiable {
                session_id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.last_updated_at = Timestamp::now();
    }
}
