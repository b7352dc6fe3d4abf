use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

use crate::hierarchy::OrganizationNode;
use crate::model::{ActorContext, LogicalEntity};
use crate::versioning::TransitionRecord;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Snapshot is corrupt: {reason}")]
    Corrupt { reason: String },
}

/// Whole-directory state as stored on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    #[serde(default)]
    pub organizations: Vec<OrganizationNode>,
    #[serde(default)]
    pub entities: Vec<LogicalEntity>,
    /// Known actors and their organization grants
    #[serde(default)]
    pub actors: Vec<ActorContext>,
    /// Audit trail of persisted transitions
    #[serde(default)]
    pub history: Vec<TransitionRecord>,
}

impl DirectorySnapshot {
    pub async fn load(path: &Path) -> Result<Self, SnapshotError> {
        let contents = fs::read_to_string(path).await?;
        let snapshot: DirectorySnapshot = serde_json::from_str(&contents)?;
        debug!(
            path = %path.display(),
            organizations = snapshot.organizations.len(),
            entities = snapshot.entities.len(),
            "Loaded directory snapshot"
        );
        Ok(snapshot)
    }

    /// Write to a temporary file first, then rename over the target
    pub async fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let serialized = serde_json::to_string_pretty(self)?;
        let temp_file = path.with_extension("json.tmp");
        fs::write(&temp_file, serialized).await?;
        fs::rename(&temp_file, path).await?;
        Ok(())
    }

    pub fn actor(&self, actor_id: &str) -> Option<&ActorContext> {
        self.actors.iter().find(|a| a.actor_id == actor_id)
    }
}
