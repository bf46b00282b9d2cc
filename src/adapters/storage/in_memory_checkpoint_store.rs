//! In-memory Checkpoint Store Adapter
//!
//! HashMap-backed store for tests and ephemeral runs. Mirrors the file
//! store's semantics, including the replace-on-same-stage rule and the
//! integrity check on load.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{CheckpointId, SessionId};
use crate::domain::session::Checkpoint;
use crate::ports::{CheckpointStore, CheckpointStoreError};

/// In-memory storage for session checkpoints.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCheckpointStore {
    // stage number -> checkpoint, per session
    checkpoints: Arc<RwLock<HashMap<SessionId, BTreeMap<u8, Checkpoint>>>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn save(&self, checkpoint: &Checkpoint) -> Result<CheckpointId, CheckpointStoreError> {
        let mut checkpoints = self.checkpoints.write().await;
        checkpoints
            .entry(checkpoint.session_id())
            .or_default()
            .insert(checkpoint.stage_number(), checkpoint.clone());
        Ok(checkpoint.id())
    }

    async fn load_latest(
        &self,
        session_id: SessionId,
    ) -> Result<Checkpoint, CheckpointStoreError> {
        let checkpoints = self.checkpoints.read().await;
        let checkpoint = checkpoints
            .get(&session_id)
            .and_then(|per_stage| per_stage.values().next_back())
            .cloned()
            .ok_or(CheckpointStoreError::NotFound(session_id))?;

        checkpoint
            .verify()
            .map_err(|_| CheckpointStoreError::IntegrityCheckFailed { session_id })?;
        Ok(checkpoint)
    }

    async fn exists(
        &self,
        session_id: SessionId,
        stage_number: u8,
    ) -> Result<bool, CheckpointStoreError> {
        let checkpoints = self.checkpoints.read().await;
        Ok(checkpoints
            .get(&session_id)
            .is_some_and(|per_stage| per_stage.contains_key(&stage_number)))
    }

    async fn count(&self, session_id: SessionId) -> Result<usize, CheckpointStoreError> {
        let checkpoints = self.checkpoints.read().await;
        Ok(checkpoints.get(&session_id).map_or(0, |m| m.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Stage;
    use crate::domain::session::{StageData, StageDeliverable};
    use std::collections::BTreeSet;

    fn checkpoint_for(session_id: SessionId, stage: Stage) -> Checkpoint {
        let fields: BTreeMap<String, serde_json::Value> = stage
            .required_fields()
            .iter()
            .map(|f| (f.to_string(), serde_json::json!("answer")))
            .collect();
        let mut data = StageData::new();
        data.insert(
            stage,
            StageDeliverable::new(stage, fields, BTreeSet::new(), vec![]).unwrap(),
        );
        Checkpoint::new(session_id, stage.number(), data).unwrap()
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let store = InMemoryCheckpointStore::new();
        let session_id = SessionId::new();

        let checkpoint = checkpoint_for(session_id, Stage::BusinessContext);
        store.save(&checkpoint).await.unwrap();

        let loaded = store.load_latest(session_id).await.unwrap();
        assert_eq!(loaded.id(), checkpoint.id());
    }

    #[tokio::test]
    async fn load_latest_picks_highest_stage() {
        let store = InMemoryCheckpointStore::new();
        let session_id = SessionId::new();

        store
            .save(&checkpoint_for(session_id, Stage::MarketAnalysis))
            .await
            .unwrap();
        store
            .save(&checkpoint_for(session_id, Stage::BusinessContext))
            .await
            .unwrap();

        let loaded = store.load_latest(session_id).await.unwrap();
        assert_eq!(loaded.stage_number(), 2);
    }

    #[tokio::test]
    async fn missing_session_is_not_found() {
        let store = InMemoryCheckpointStore::new();
        let result = store.load_latest(SessionId::new()).await;
        assert!(matches!(result, Err(CheckpointStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn same_stage_save_replaces() {
        let store = InMemoryCheckpointStore::new();
        let session_id = SessionId::new();

        store
            .save(&checkpoint_for(session_id, Stage::BusinessContext))
            .await
            .unwrap();
        store
            .save(&checkpoint_for(session_id, Stage::BusinessContext))
            .await
            .unwrap();

        assert_eq!(store.count(session_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = InMemoryCheckpointStore::new();
        let a = SessionId::new();
        let b = SessionId::new();

        store
            .save(&checkpoint_for(a, Stage::BusinessContext))
            .await
            .unwrap();

        assert_eq!(store.count(a).await.unwrap(), 1);
        assert_eq!(store.count(b).await.unwrap(), 0);
    }
}
