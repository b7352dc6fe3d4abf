// Versions and the logical entities that own them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{OrganizationId, UnificRootId, VersionId};
use super::payload::Payload;
use super::status::{EntityType, PublishingStatus};

/// One snapshot of a logical entity's content at a lifecycle state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub id: VersionId,
    pub unific_root_id: UnificRootId,
    pub entity_type: EntityType,
    /// Position in the version chain, starting at 1
    pub version_number: u32,
    pub status: PublishingStatus,
    pub payload: Payload,
    /// Owning organization; hierarchy-dependent rules and authorization use it
    pub organization_id: OrganizationId,
    /// Version this one was created from, if any
    #[serde(default)]
    pub predecessor: Option<VersionId>,
    pub modified_at: DateTime<Utc>,
    #[serde(default)]
    pub modified_by: Option<String>,
}

impl Version {
    /// Create the first draft of a new logical entity
    pub fn first_draft(
        unific_root_id: UnificRootId,
        organization_id: OrganizationId,
        payload: Payload,
        modified_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: VersionId::new(),
            unific_root_id,
            entity_type: payload.entity_type(),
            version_number: 1,
            status: PublishingStatus::Draft,
            payload,
            organization_id,
            predecessor: None,
            modified_at,
            modified_by: None,
        }
    }
}

/// A stable identity and its ordered chain of versions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalEntity {
    pub unific_root_id: UnificRootId,
    pub entity_type: EntityType,
    /// Optimistic-concurrency token, bumped on every persisted transition
    #[serde(default)]
    pub revision: u64,
    pub versions: Vec<Version>,
}

/// Structural problem found in an entity snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityInconsistency {
    ForeignVersion { version: VersionId },
    EntityTypeMismatch { version: VersionId },
    MultiplePublished { versions: Vec<VersionId> },
    MultipleDrafts { versions: Vec<VersionId> },
    DuplicateVersionId { version: VersionId },
}

impl std::fmt::Display for EntityInconsistency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityInconsistency::ForeignVersion { version } => {
                write!(f, "version {version} belongs to another entity")
            }
            EntityInconsistency::EntityTypeMismatch { version } => {
                write!(f, "version {version} has a different entity type")
            }
            EntityInconsistency::MultiplePublished { versions } => {
                write!(f, "{} versions are published", versions.len())
            }
            EntityInconsistency::MultipleDrafts { versions } => {
                write!(f, "{} versions are drafts", versions.len())
            }
            EntityInconsistency::DuplicateVersionId { version } => {
                write!(f, "version id {version} appears more than once")
            }
        }
    }
}

impl LogicalEntity {
    pub fn new(first: Version) -> Self {
        Self {
            unific_root_id: first.unific_root_id,
            entity_type: first.entity_type,
            revision: 0,
            versions: vec![first],
        }
    }

    pub fn version(&self, id: VersionId) -> Option<&Version> {
        self.versions.iter().find(|v| v.id == id)
    }

    pub fn version_mut(&mut self, id: VersionId) -> Option<&mut Version> {
        self.versions.iter_mut().find(|v| v.id == id)
    }

    pub fn versions_in(&self, status: PublishingStatus) -> impl Iterator<Item = &Version> {
        self.versions.iter().filter(move |v| v.status == status)
    }

    pub fn published(&self) -> Option<&Version> {
        self.versions_in(PublishingStatus::Published).next()
    }

    pub fn draft(&self) -> Option<&Version> {
        self.versions_in(PublishingStatus::Draft).next()
    }

    pub fn latest_version_number(&self) -> u32 {
        self.versions.iter().map(|v| v.version_number).max().unwrap_or(0)
    }

    /// The version readers should see: published, else draft, else the newest one
    pub fn current_version(&self) -> Option<&Version> {
        self.published()
            .or_else(|| self.draft())
            .or_else(|| self.versions.iter().max_by_key(|v| v.version_number))
    }

    /// Overall lifecycle status of the entity
    pub fn status(&self) -> PublishingStatus {
        let has = |status| self.versions.iter().any(|v| v.status == status);

        match (has(PublishingStatus::Published), has(PublishingStatus::Draft)) {
            (true, true) => PublishingStatus::Modified,
            (true, false) => PublishingStatus::Published,
            (false, true) => PublishingStatus::Draft,
            (false, false) => {
                if has(PublishingStatus::Modified) {
                    PublishingStatus::Modified
                } else if has(PublishingStatus::Removed) {
                    PublishingStatus::Removed
                } else if has(PublishingStatus::OldPublished) {
                    PublishingStatus::OldPublished
                } else {
                    PublishingStatus::Deleted
                }
            }
        }
    }

    /// Live versions that name `id` as their predecessor
    pub fn live_successors_of(&self, id: VersionId) -> impl Iterator<Item = &Version> {
        self.versions
            .iter()
            .filter(move |v| v.id != id && v.predecessor == Some(id) && v.status.is_live())
    }

    /// Check the structural invariants of the version chain
    pub fn check_invariants(&self) -> Result<(), EntityInconsistency> {
        let mut seen = std::collections::HashSet::new();
        for version in &self.versions {
            if !seen.insert(version.id) {
                return Err(EntityInconsistency::DuplicateVersionId { version: version.id });
            }
            if version.unific_root_id != self.unific_root_id {
                return Err(EntityInconsistency::ForeignVersion { version: version.id });
            }
            if version.entity_type != self.entity_type {
                return Err(EntityInconsistency::EntityTypeMismatch { version: version.id });
            }
        }

        let published: Vec<VersionId> = self
            .versions_in(PublishingStatus::Published)
            .map(|v| v.id)
            .collect();
        if published.len() > 1 {
            return Err(EntityInconsistency::MultiplePublished { versions: published });
        }

        let drafts: Vec<VersionId> = self.versions_in(PublishingStatus::Draft).map(|v| v.id).collect();
        if drafts.len() > 1 {
            return Err(EntityInconsistency::MultipleDrafts { versions: drafts });
        }

        Ok(())
    }
}
