use thiserror::Error;

use crate::hierarchy::{node::join_ids, HierarchyError};
use crate::model::{EntityInconsistency, OrganizationId, PublishingStatus, UnificRootId, VersionId};
use crate::validation::ValidationVerdict;
use crate::versioning::TransitionError;

/// Failure reported by a persistence collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("Entity {entity} changed since revision {expected_revision}")]
    ConcurrencyConflict {
        entity: UnificRootId,
        expected_revision: u64,
    },

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Persistence backend error: {0}")]
    Backend(String),
}

/// Every way a transition request can fail
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PublishingError {
    #[error("Validation failed: {0}")]
    ValidationFailed(Box<ValidationVerdict>),

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: PublishingStatus,
        to: PublishingStatus,
    },

    #[error("Organization hierarchy contains a cycle through {}", join_ids(.nodes))]
    CycleDetected { nodes: Vec<OrganizationId> },

    #[error("Organization {node} declares more than one parent: {}", join_ids(.parents))]
    ConflictingParents {
        node: OrganizationId,
        parents: Vec<OrganizationId>,
    },

    #[error("Operation forbidden: {reason}")]
    OperationForbidden { reason: String },

    #[error("Entity {entity} kept changing; gave up after {attempts} attempt(s)")]
    ConcurrencyConflict { entity: UnificRootId, attempts: u32 },

    #[error("Version {0} not found")]
    VersionNotFound(VersionId),

    #[error("Entity {0} not found")]
    EntityNotFound(UnificRootId),

    #[error("Inconsistent entity: {0}")]
    InconsistentEntity(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl PublishingError {
    /// Only lost optimistic-concurrency races are worth re-running
    pub fn is_retryable(&self) -> bool {
        matches!(self, PublishingError::ConcurrencyConflict { .. })
    }

    /// Short machine-readable name, used as a log field and metric label
    pub fn kind(&self) -> &'static str {
        match self {
            PublishingError::ValidationFailed(_) => "validation_failed",
            PublishingError::InvalidTransition { .. } => "invalid_transition",
            PublishingError::CycleDetected { .. } => "cycle_detected",
            PublishingError::ConflictingParents { .. } => "conflicting_parents",
            PublishingError::OperationForbidden { .. } => "operation_forbidden",
            PublishingError::ConcurrencyConflict { .. } => "concurrency_conflict",
            PublishingError::VersionNotFound(_) => "version_not_found",
            PublishingError::EntityNotFound(_) => "entity_not_found",
            PublishingError::InconsistentEntity(_) => "inconsistent_entity",
            PublishingError::Persistence(_) => "persistence",
        }
    }
}

impl From<HierarchyError> for PublishingError {
    fn from(err: HierarchyError) -> Self {
        match err {
            HierarchyError::CycleDetected { nodes } => PublishingError::CycleDetected { nodes },
            HierarchyError::ConflictingParents { node, parents } => {
                PublishingError::ConflictingParents { node, parents }
            }
        }
    }
}

impl From<TransitionError> for PublishingError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::InvalidTransition { from, to } => {
                PublishingError::InvalidTransition { from, to }
            }
            TransitionError::OperationForbidden { reason } => {
                PublishingError::OperationForbidden { reason }
            }
            TransitionError::ValidationFailed(verdict) => PublishingError::ValidationFailed(verdict),
            TransitionError::VerdictMissing { version_id } => PublishingError::OperationForbidden {
                reason: format!("version {version_id} has not been validated"),
            },
            TransitionError::VersionNotFound(id) => PublishingError::VersionNotFound(id),
            TransitionError::InconsistentEntity(inconsistency) => {
                PublishingError::InconsistentEntity(inconsistency.to_string())
            }
        }
    }
}

impl From<EntityInconsistency> for PublishingError {
    fn from(err: EntityInconsistency) -> Self {
        PublishingError::InconsistentEntity(err.to_string())
    }
}

impl From<PersistenceError> for PublishingError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::ConcurrencyConflict { entity, .. } => {
                PublishingError::ConcurrencyConflict { entity, attempts: 1 }
            }
            other => PublishingError::Persistence(other.to_string()),
        }
    }
}
