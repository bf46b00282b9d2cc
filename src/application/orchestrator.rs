//! Session orchestration.
//!
//! The orchestrator owns the workflow around the domain: it serializes
//! work per session through the lock registry, runs stage interviews,
//! gates advancement, writes checkpoints before moving forward, and
//! restores sessions from their latest checkpoint.

use std::sync::Arc;

use thiserror::Error;

use crate::config::GatePolicy;
use crate::domain::conversation::ConversationEngine;
use crate::domain::foundation::{DomainError, SessionId, Stage, UserId};
use crate::domain::gate::{ConsistencyChecker, ConsistencyReport, GateOutcome, StageGateValidator};
use crate::domain::session::{Checkpoint, Session, SessionError, StageDeliverable};
use crate::ports::{
    CheckpointStore, CheckpointStoreError, Respondent, SessionRepository, StageQuestionProvider,
};

use super::locks::SessionLocks;
use super::stage_runner::{StageError, StageRunner};

/// Errors from orchestrator operations.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("No checkpoint found for session: {0}")]
    CheckpointNotFound(SessionId),

    #[error("Stage {requested:?} is ahead of the session's current stage {current:?}")]
    StageAhead { requested: Stage, current: Stage },

    #[error("Consistency check requires all stages complete; {stage:?} is not")]
    PipelineIncomplete { stage: Stage },

    #[error("Pipeline contradicts itself: {issues:?}")]
    ConsistencyBlocked { issues: Vec<String> },

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Checkpoint persistence failed: {0}")]
    Checkpoint(CheckpointStoreError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<CheckpointStoreError> for OrchestratorError {
    fn from(err: CheckpointStoreError) -> Self {
        match err {
            CheckpointStoreError::NotFound(session_id) => {
                OrchestratorError::CheckpointNotFound(session_id)
            }
            other => OrchestratorError::Checkpoint(other),
        }
    }
}

/// What an `advance_stage` call resolved to.
#[derive(Debug)]
pub enum AdvanceOutcome {
    /// The gate passed and the session moved to this stage.
    Advanced { to: Stage },
    /// The final stage's gate passed; the session is complete.
    Completed,
    /// The session had already advanced past the given stage; nothing was
    /// written.
    AlreadyAdvanced { current_stage: Stage },
    /// The gate rejected advancement; the session did not move.
    Rejected(GateOutcome),
}

/// Coordinates sessions through the interview pipeline.
pub struct SessionOrchestrator {
    repository: Arc<dyn SessionRepository>,
    checkpoints: Arc<dyn CheckpointStore>,
    engine: ConversationEngine,
    validator: StageGateValidator,
    consistency: ConsistencyChecker,
    locks: SessionLocks,
    policy: GatePolicy,
}

impl SessionOrchestrator {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        checkpoints: Arc<dyn CheckpointStore>,
        engine: ConversationEngine,
        validator: StageGateValidator,
        policy: GatePolicy,
    ) -> Self {
        Self {
            repository,
            checkpoints,
            engine,
            validator,
            consistency: ConsistencyChecker::new(),
            locks: SessionLocks::default(),
            policy,
        }
    }

    /// Creates and persists a new session at the first stage.
    pub async fn create_session(
        &self,
        user_id: UserId,
        project_name: impl Into<String>,
    ) -> Result<Session, OrchestratorError> {
        let session = Session::new(user_id, project_name)?;
        self.repository.save(&session).await?;
        tracing::info!(session_id = %session.id(), "session created");
        Ok(session)
    }

    /// Runs the current stage's interview and records its deliverable.
    ///
    /// Holds the session lock for the duration; a concurrent `run_stage`
    /// or `advance_stage` on the same session fails with
    /// `ConcurrencyConflict`.
    pub async fn run_stage(
        &self,
        session_id: SessionId,
        provider: &dyn StageQuestionProvider,
        respondent: &dyn Respondent,
    ) -> Result<StageDeliverable, OrchestratorError> {
        let _guard = self.locks.try_acquire(session_id)?;
        let mut session = self.load(session_id).await?;

        let stage = session.current_stage();
        let runner = StageRunner::new(&self.engine, self.policy.escalation);
        let deliverable = runner
            .run(session_id, stage, session.stage_data(), provider, respondent)
            .await?;

        session.record_deliverable(deliverable.clone())?;
        self.repository.update(&session).await?;
        Ok(deliverable)
    }

    /// Advances the session past `from_stage` once its gate passes.
    ///
    /// Idempotent: a repeat call with a stage the session already moved
    /// past returns `AlreadyAdvanced` and writes nothing. The checkpoint
    /// write happens before the stage pointer moves, so a persistence
    /// failure never leaves the session advanced without a durable record.
    pub async fn advance_stage(
        &self,
        session_id: SessionId,
        from_stage: Stage,
    ) -> Result<AdvanceOutcome, OrchestratorError> {
        let _guard = self.locks.try_acquire(session_id)?;
        let mut session = self.load(session_id).await?;

        let current = session.current_stage();
        if from_stage.is_before(&current) || !session.status().is_active() {
            return Ok(AdvanceOutcome::AlreadyAdvanced {
                current_stage: current,
            });
        }
        if current.is_before(&from_stage) {
            return Err(OrchestratorError::StageAhead {
                requested: from_stage,
                current,
            });
        }

        let gate = self
            .validator
            .validate(current, session.deliverable(current))
            .await;
        if !gate.passed() {
            return Ok(AdvanceOutcome::Rejected(gate));
        }

        let checkpoint =
            Checkpoint::new(session_id, current.number(), session.stage_data().clone())?;
        self.checkpoints.save(&checkpoint).await?;

        if current.is_last() {
            session.mark_completed()?;
            self.repository.update(&session).await?;
            self.locks.evict(session_id);
            tracing::info!(session_id = %session_id, "session completed");
            return Ok(AdvanceOutcome::Completed);
        }

        let to = session.advance()?;
        self.repository.update(&session).await?;
        tracing::info!(session_id = %session_id, from = ?current, to = ?to, "stage advanced");
        Ok(AdvanceOutcome::Advanced { to })
    }

    /// Restores a session from its latest checkpoint.
    pub async fn resume_session(&self, session_id: SessionId) -> Result<Session, OrchestratorError> {
        let _guard = self.locks.try_acquire(session_id)?;
        let mut session = self.load(session_id).await?;

        let checkpoint = self.checkpoints.load_latest(session_id).await?;
        session.restore_from_checkpoint(&checkpoint)?;
        self.repository.update(&session).await?;
        tracing::info!(
            session_id = %session_id,
            resumed_at = ?session.current_stage(),
            "session resumed from checkpoint"
        );
        Ok(session)
    }

    /// Runs the cross-stage consistency check over a finished pipeline.
    ///
    /// The report is advisory by default. With
    /// `GatePolicy.consistency_blocking` set, an inconsistent pipeline comes
    /// back as `ConsistencyBlocked` so callers gate final assembly on it.
    pub async fn check_consistency(
        &self,
        session_id: SessionId,
    ) -> Result<ConsistencyReport, OrchestratorError> {
        let session = self.load(session_id).await?;
        for stage in Stage::all() {
            if session.deliverable(*stage).is_none() {
                return Err(OrchestratorError::PipelineIncomplete { stage: *stage });
            }
        }

        let report = self.consistency.check(session.stage_data());
        if self.policy.consistency_blocking && !report.is_consistent() {
            return Err(OrchestratorError::ConsistencyBlocked {
                issues: report.issues().to_vec(),
            });
        }
        Ok(report)
    }

    async fn load(&self, session_id: SessionId) -> Result<Session, OrchestratorError> {
        self.repository
            .find_by_id(&session_id)
            .await?
            .ok_or(OrchestratorError::SessionNotFound(session_id))
    }
}
