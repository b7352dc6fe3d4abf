use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{EntityType, LogicalEntity, PublishingStatus, UnificRootId, Version, VersionId};
use crate::validation::ValidationVerdict;

/// Status change of a single version within one transition.
///
/// `from` is `None` for a version created by the transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionChange {
    pub version_id: VersionId,
    pub from: Option<PublishingStatus>,
    pub to: PublishingStatus,
}

/// Audit entry for an applied transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub unific_root_id: UnificRootId,
    pub version_id: VersionId,
    pub from: PublishingStatus,
    pub to: PublishingStatus,
    pub actor_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of a permitted transition, ready to be persisted as one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionResult {
    pub unific_root_id: UnificRootId,
    pub entity_type: EntityType,
    /// Version the transition was requested for
    pub version_id: VersionId,
    pub from: PublishingStatus,
    pub to: PublishingStatus,
    pub entity_status_before: PublishingStatus,
    pub entity_status_after: PublishingStatus,
    /// Revision the snapshot had when the transition was computed
    pub expected_revision: u64,
    /// Entity state after the transition
    pub entity: LogicalEntity,
    pub changes: Vec<VersionChange>,
    pub created_version: Option<VersionId>,
    pub record: TransitionRecord,
    /// Verdict that allowed a publish, if one was needed
    pub verdict: Option<ValidationVerdict>,
}

impl TransitionResult {
    /// Versions touched by the transition, in change order
    pub fn changed_versions(&self) -> impl Iterator<Item = &Version> {
        self.changes
            .iter()
            .filter_map(|change| self.entity.version(change.version_id))
    }

    pub fn published_version(&self) -> Option<&Version> {
        self.entity.published()
    }

    pub fn change_for(&self, version_id: VersionId) -> Option<&VersionChange> {
        self.changes.iter().find(|c| c.version_id == version_id)
    }
}
