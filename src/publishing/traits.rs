// Collaborator interfaces the publishing manager depends on

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use super::errors::PersistenceError;
use crate::hierarchy::OrganizationNode;
use crate::model::{ActorContext, LogicalEntity, OrganizationId, PublishingStatus, UnificRootId, Version, VersionId};
use crate::versioning::TransitionResult;

/// Storage for versions, entities and the organization hierarchy
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait::async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Organization relations relevant to `scope`; `None` means the whole hierarchy
    async fn load_hierarchy(
        &self,
        scope: Option<OrganizationId>,
    ) -> Result<Vec<OrganizationNode>, PersistenceError>;

    async fn load_version(&self, id: VersionId) -> Result<Option<Version>, PersistenceError>;

    async fn load_entity(&self, id: UnificRootId) -> Result<Option<LogicalEntity>, PersistenceError>;

    /// Apply a transition atomically.
    ///
    /// Fails with [`PersistenceError::ConcurrencyConflict`] when the stored
    /// entity revision differs from `result.expected_revision`.
    async fn persist(&self, result: &TransitionResult) -> Result<(), PersistenceError>;
}

/// Decides whether an actor may move a version to a target status
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait::async_trait]
pub trait AuthorizationPolicy: Send + Sync {
    async fn can_actor_transition(
        &self,
        actor: &ActorContext,
        version: &Version,
        target: PublishingStatus,
    ) -> bool;
}
