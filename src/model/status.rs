// Lifecycle and classification enums shared across the workflow

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle phase of a version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishingStatus {
    /// Editable, not visible to the public
    Draft,
    /// The live version of the entity
    Published,
    /// Overall status of an entity whose published version has a newer draft
    Modified,
    /// Superseded published version retained for history
    OldPublished,
    /// Soft-deleted, excluded from default queries
    Removed,
    /// Terminal, eligible for hard removal
    Deleted,
}

impl PublishingStatus {
    pub const ALL: [PublishingStatus; 6] = [
        PublishingStatus::Draft,
        PublishingStatus::Published,
        PublishingStatus::Modified,
        PublishingStatus::OldPublished,
        PublishingStatus::Removed,
        PublishingStatus::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PublishingStatus::Draft => "draft",
            PublishingStatus::Published => "published",
            PublishingStatus::Modified => "modified",
            PublishingStatus::OldPublished => "old_published",
            PublishingStatus::Removed => "removed",
            PublishingStatus::Deleted => "deleted",
        }
    }

    /// Versions that still take part in the live lifecycle of an entity
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            PublishingStatus::Draft | PublishingStatus::Published | PublishingStatus::Modified
        )
    }
}

impl fmt::Display for PublishingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PublishingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        PublishingStatus::ALL
            .iter()
            .find(|status| status.as_str() == normalized)
            .copied()
            .ok_or_else(|| format!("unknown publishing status '{s}'"))
    }
}

/// Entity type tag selecting the validation rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Organization,
    Service,
    Channel,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityType::Organization => "organization",
            EntityType::Service => "service",
            EntityType::Channel => "channel",
        };
        f.write_str(name)
    }
}

/// State of an organization node as seen by hierarchy-dependent rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    #[default]
    Active,
    Archived,
    Removed,
}
