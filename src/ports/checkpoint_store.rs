//! Checkpoint Store Port - durable, atomic snapshot persistence.
//!
//! Checkpoints are append-only: a stored checkpoint is never mutated or
//! deleted by the engine. Implementations must guarantee that a concurrent
//! reader can never observe a half-written checkpoint.

use async_trait::async_trait;

use crate::domain::foundation::{CheckpointId, SessionId};
use crate::domain::session::Checkpoint;

/// Errors that can occur during checkpoint persistence.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointStoreError {
    #[error("No checkpoint found for session: {0}")]
    NotFound(SessionId),

    #[error("Failed to serialize checkpoint: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize checkpoint: {0}")]
    DeserializationFailed(String),

    #[error("Checkpoint for session {session_id} failed its integrity check")]
    IntegrityCheckFailed { session_id: SessionId },

    #[error("IO error: {0}")]
    IoError(String),
}

/// Port for persisting and loading session checkpoints.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Durably saves a checkpoint.
    ///
    /// The write must be atomic: either the complete checkpoint becomes
    /// visible or nothing does. Saving a checkpoint for a stage that already
    /// has one replaces it in place rather than duplicating it.
    async fn save(&self, checkpoint: &Checkpoint) -> Result<CheckpointId, CheckpointStoreError>;

    /// Loads the checkpoint with the highest stage number for a session.
    ///
    /// # Errors
    /// Returns `CheckpointStoreError::NotFound` if the session has no
    /// checkpoints.
    async fn load_latest(&self, session_id: SessionId) -> Result<Checkpoint, CheckpointStoreError>;

    /// Returns true if a checkpoint exists for the given stage number.
    async fn exists(
        &self,
        session_id: SessionId,
        stage_number: u8,
    ) -> Result<bool, CheckpointStoreError>;

    /// Counts the checkpoints stored for a session.
    async fn count(&self, session_id: SessionId) -> Result<usize, CheckpointStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn CheckpointStore) {}
    }

    #[test]
    fn not_found_error_names_the_session() {
        let id = SessionId::new();
        let err = CheckpointStoreError::NotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }
}
