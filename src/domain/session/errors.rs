//! Session domain errors.

use thiserror::Error;

use crate::domain::foundation::{
    DomainError, ErrorCode, SessionId, SessionStatus, Stage, ValidationError,
};

/// Errors from session aggregate operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Session {session_id} is {status:?} and cannot be modified")]
    NotModifiable {
        session_id: SessionId,
        status: SessionStatus,
    },

    #[error("Stage {expected:?} must complete before {requested:?} can be recorded")]
    StageOutOfOrder { expected: Stage, requested: Stage },

    #[error("Stage {stage:?} has no deliverable yet")]
    StageNotComplete { stage: Stage },

    #[error("Session {session_id} has no further stage to advance to")]
    AlreadyAtFinalStage { session_id: SessionId },

    #[error("Invalid status transition from {from:?} to {to:?}")]
    InvalidStatusTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    #[error("Checkpoint for session {session_id} stage {stage_number} failed its integrity check")]
    CorruptCheckpoint {
        session_id: SessionId,
        stage_number: u8,
    },

    #[error("Checkpoint belongs to session {checkpoint_session}, not {session_id}")]
    CheckpointSessionMismatch {
        session_id: SessionId,
        checkpoint_session: SessionId,
    },

    #[error("Failed to serialize session snapshot: {0}")]
    SnapshotSerialization(String),
}

impl From<SessionError> for DomainError {
    fn from(err: SessionError) -> Self {
        let code = match &err {
            SessionError::Validation(_) => ErrorCode::ValidationFailed,
            SessionError::NotModifiable { status, .. } => match status {
                SessionStatus::Completed => ErrorCode::SessionCompleted,
                SessionStatus::Failed => ErrorCode::SessionFailed,
                _ => ErrorCode::InvalidStateTransition,
            },
            SessionError::StageOutOfOrder { .. } | SessionError::StageNotComplete { .. } => {
                ErrorCode::StageNotComplete
            }
            SessionError::AlreadyAtFinalStage { .. }
            | SessionError::InvalidStatusTransition { .. } => ErrorCode::InvalidStateTransition,
            SessionError::CorruptCheckpoint { .. }
            | SessionError::CheckpointSessionMismatch { .. } => ErrorCode::CorruptCheckpoint,
            SessionError::SnapshotSerialization(_) => ErrorCode::PersistenceFailed,
        };
        DomainError::new(code, err.to_string())
    }
}
