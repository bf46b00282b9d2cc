//! File-based Checkpoint Store Adapter
//!
//! Stores checkpoints as YAML files on disk, one directory per session with
//! one file per stage. Writes go through a temp file and an atomic rename so
//! a concurrent reader can never observe a half-written checkpoint.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::foundation::{CheckpointId, SessionId};
use crate::domain::session::Checkpoint;
use crate::ports::{CheckpointStore, CheckpointStoreError};

/// File-based storage for session checkpoints.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    base_path: PathBuf,
}

impl FileCheckpointStore {
    /// Create a new file store with a base directory
    ///
    /// # Example
    /// ```ignore
    /// let store = FileCheckpointStore::new("./data/checkpoints");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Get the directory path for a specific session
    fn session_dir(&self, session_id: SessionId) -> PathBuf {
        self.base_path.join(session_id.to_string())
    }

    /// Get the checkpoint file path for a stage
    fn checkpoint_path(&self, session_id: SessionId, stage_number: u8) -> PathBuf {
        self.session_dir(session_id)
            .join(format!("checkpoint_{:02}.yaml", stage_number))
    }

    /// List the stage numbers with a stored checkpoint, ascending
    async fn stored_stages(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<u8>, CheckpointStoreError> {
        let dir = self.session_dir(session_id);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut stages = Vec::new();
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| CheckpointStoreError::IoError(e.to_string()))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CheckpointStoreError::IoError(e.to_string()))?
        {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(stage) = name
                .strip_prefix("checkpoint_")
                .and_then(|rest| rest.strip_suffix(".yaml"))
                .and_then(|digits| digits.parse::<u8>().ok())
            {
                stages.push(stage);
            }
        }
        stages.sort_unstable();
        Ok(stages)
    }

    async fn read_checkpoint(
        &self,
        session_id: SessionId,
        stage_number: u8,
    ) -> Result<Checkpoint, CheckpointStoreError> {
        let path = self.checkpoint_path(session_id, stage_number);
        let yaml = fs::read_to_string(&path)
            .await
            .map_err(|e| CheckpointStoreError::IoError(e.to_string()))?;

        let checkpoint: Checkpoint = serde_yaml::from_str(&yaml)
            .map_err(|e| CheckpointStoreError::DeserializationFailed(e.to_string()))?;

        checkpoint
            .verify()
            .map_err(|_| CheckpointStoreError::IntegrityCheckFailed { session_id })?;

        Ok(checkpoint)
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn save(&self, checkpoint: &Checkpoint) -> Result<CheckpointId, CheckpointStoreError> {
        let dir = self.session_dir(checkpoint.session_id());
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| CheckpointStoreError::IoError(e.to_string()))?;

        let yaml = serde_yaml::to_string(checkpoint)
            .map_err(|e| CheckpointStoreError::SerializationFailed(e.to_string()))?;

        // Temp file next to the target so the rename stays on one filesystem.
        let final_path = self.checkpoint_path(checkpoint.session_id(), checkpoint.stage_number());
        let tmp_path = final_path.with_extension("yaml.tmp");

        fs::write(&tmp_path, yaml)
            .await
            .map_err(|e| CheckpointStoreError::IoError(e.to_string()))?;
        fs::rename(&tmp_path, &final_path)
            .await
            .map_err(|e| CheckpointStoreError::IoError(e.to_string()))?;

        tracing::debug!(
            session_id = %checkpoint.session_id(),
            stage = checkpoint.stage_number(),
            "checkpoint written"
        );
        Ok(checkpoint.id())
    }

    async fn load_latest(
        &self,
        session_id: SessionId,
    ) -> Result<Checkpoint, CheckpointStoreError> {
        let stages = self.stored_stages(session_id).await?;
        let latest = stages
            .last()
            .copied()
            .ok_or(CheckpointStoreError::NotFound(session_id))?;
        self.read_checkpoint(session_id, latest).await
    }

    async fn exists(
        &self,
        session_id: SessionId,
        stage_number: u8,
    ) -> Result<bool, CheckpointStoreError> {
        Ok(self.checkpoint_path(session_id, stage_number).exists())
    }

    async fn count(&self, session_id: SessionId) -> Result<usize, CheckpointStoreError> {
        Ok(self.stored_stages(session_id).await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Stage;
    use crate::domain::session::{StageData, StageDeliverable};
    use std::collections::{BTreeMap, BTreeSet};
    use tempfile::TempDir;

    fn stage_data_through(last: Stage) -> StageData {
        let mut data = StageData::new();
        for stage in Stage::all() {
            let fields: BTreeMap<String, serde_json::Value> = stage
                .required_fields()
                .iter()
                .map(|f| (f.to_string(), serde_json::json!("answer")))
                .collect();
            data.insert(
                *stage,
                StageDeliverable::new(*stage, fields, BTreeSet::new(), vec![]).unwrap(),
            );
            if *stage == last {
                break;
            }
        }
        data
    }

    fn checkpoint_for(session_id: SessionId, stage: Stage) -> Checkpoint {
        Checkpoint::new(session_id, stage.number(), stage_data_through(stage)).unwrap()
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(temp_dir.path());
        let session_id = SessionId::new();

        let checkpoint = checkpoint_for(session_id, Stage::BusinessContext);
        store.save(&checkpoint).await.unwrap();

        let loaded = store.load_latest(session_id).await.unwrap();
        assert_eq!(loaded.id(), checkpoint.id());
        assert_eq!(loaded.stage_number(), 1);
        assert_eq!(loaded.checksum(), checkpoint.checksum());
    }

    #[tokio::test]
    async fn load_latest_picks_highest_stage() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(temp_dir.path());
        let session_id = SessionId::new();

        for stage in [Stage::BusinessContext, Stage::MarketAnalysis, Stage::Offering] {
            store.save(&checkpoint_for(session_id, stage)).await.unwrap();
        }

        let loaded = store.load_latest(session_id).await.unwrap();
        assert_eq!(loaded.stage_number(), 3);
        assert_eq!(store.count(session_id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn load_latest_without_checkpoints_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(temp_dir.path());

        let result = store.load_latest(SessionId::new()).await;
        assert!(matches!(result, Err(CheckpointStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn saving_same_stage_replaces_not_duplicates() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(temp_dir.path());
        let session_id = SessionId::new();

        store
            .save(&checkpoint_for(session_id, Stage::BusinessContext))
            .await
            .unwrap();
        let second = checkpoint_for(session_id, Stage::BusinessContext);
        store.save(&second).await.unwrap();

        assert_eq!(store.count(session_id).await.unwrap(), 1);
        let loaded = store.load_latest(session_id).await.unwrap();
        assert_eq!(loaded.id(), second.id());
    }

    #[tokio::test]
    async fn corrupted_file_fails_integrity_check() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(temp_dir.path());
        let session_id = SessionId::new();

        let checkpoint = checkpoint_for(session_id, Stage::BusinessContext);
        store.save(&checkpoint).await.unwrap();

        let path = store.checkpoint_path(session_id, 1);
        let yaml = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, yaml.replace("answer", "edited")).unwrap();

        let result = store.load_latest(session_id).await;
        assert!(matches!(
            result,
            Err(CheckpointStoreError::IntegrityCheckFailed { .. })
        ));
    }

    #[tokio::test]
    async fn exists_tracks_individual_stages() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(temp_dir.path());
        let session_id = SessionId::new();

        assert!(!store.exists(session_id, 1).await.unwrap());
        store
            .save(&checkpoint_for(session_id, Stage::BusinessContext))
            .await
            .unwrap();
        assert!(store.exists(session_id, 1).await.unwrap());
        assert!(!store.exists(session_id, 2).await.unwrap());
    }

    #[tokio::test]
    async fn no_temp_files_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(temp_dir.path());
        let session_id = SessionId::new();

        store
            .save(&checkpoint_for(session_id, Stage::BusinessContext))
            .await
            .unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(store.session_dir(session_id))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
