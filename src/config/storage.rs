//! Checkpoint storage settings.

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Where durable session state lives on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory for per-session checkpoint files.
    #[serde(default = "default_checkpoint_dir")]
    pub checkpoint_dir: String,
}

impl StorageConfig {
    /// Returns the checkpoint root as a path.
    pub fn checkpoint_path(&self) -> PathBuf {
        PathBuf::from(&self.checkpoint_dir)
    }

    /// Validates storage configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.checkpoint_dir.trim().is_empty() {
            return Err(ValidationError::EmptyCheckpointDir);
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: default_checkpoint_dir(),
        }
    }
}

fn default_checkpoint_dir() -> String {
    "./data/checkpoints".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_data_dir() {
        let config = StorageConfig::default();
        assert_eq!(config.checkpoint_dir, "./data/checkpoints");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_dir_is_rejected() {
        let config = StorageConfig {
            checkpoint_dir: "  ".to_string(),
        };
        assert_eq!(config.validate(), Err(ValidationError::EmptyCheckpointDir));
    }
}
