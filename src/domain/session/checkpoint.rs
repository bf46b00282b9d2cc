//! Durable session snapshots with integrity checksums.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::deliverable::StageData;
use super::errors::SessionError;
use crate::domain::foundation::{CheckpointId, SessionId, Timestamp};

/// A durable snapshot of a session taken after a stage completes.
///
/// The checksum is SHA-256 over the serialized stage data plus the
/// session id and stage number, so a snapshot tampered with or torn on
/// disk is detected at load time rather than silently resumed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    id: CheckpointId,
    session_id: SessionId,
    stage_number: u8,
    stage_data: StageData,
    checksum: String,
    created_at: Timestamp,
}

impl Checkpoint {
    /// Creates a checkpoint, computing the integrity checksum.
    pub fn new(
        session_id: SessionId,
        stage_number: u8,
        stage_data: StageData,
    ) -> Result<Self, SessionError> {
        let checksum = Self::compute_checksum(&session_id, stage_number, &stage_data)?;
        Ok(Self {
            id: CheckpointId::new(),
            session_id,
            stage_number,
            stage_data,
            checksum,
            created_at: Timestamp::now(),
        })
    }

    /// Recomputes the checksum and compares it against the stored one.
    pub fn verify(&self) -> Result<(), SessionError> {
        let expected =
            Self::compute_checksum(&self.session_id, self.stage_number, &self.stage_data)?;
        if expected != self.checksum {
            return Err(SessionError::CorruptCheckpoint {
                session_id: self.session_id,
                stage_number: self.stage_number,
            });
        }
        Ok(())
    }

    fn compute_checksum(
        session_id: &SessionId,
        stage_number: u8,
        stage_data: &StageData,
    ) -> Result<String, SessionError> {
        // StageData is a BTreeMap, so this serialization is canonical.
        let payload = serde_json::to_vec(stage_data)
            .map_err(|e| SessionError::SnapshotSerialization(e.to_string()))?;
        let mut hasher = Sha256::new();
        hasher.update(session_id.as_uuid().as_bytes());
        hasher.update([stage_number]);
        hasher.update(&payload);
        Ok(format!("{:x}", hasher.finalize()))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> CheckpointId {
        self.id
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Number of the stage that had just completed when this was taken.
    pub fn stage_number(&self) -> u8 {
        self.stage_number
    }

    pub fn stage_data(&self) -> &StageData {
        &self.stage_data
    }

    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}
