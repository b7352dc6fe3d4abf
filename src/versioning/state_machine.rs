use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info};

use super::result::{TransitionRecord, TransitionResult, VersionChange};
use crate::model::{EntityInconsistency, LogicalEntity, PublishingStatus, Version, VersionId};
use crate::validation::ValidationVerdict;

use PublishingStatus::*;

/// Errors that can occur while computing a version transition
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    #[error("Invalid transition: {from} -> {to} is not permitted")]
    InvalidTransition {
        from: PublishingStatus,
        to: PublishingStatus,
    },

    #[error("Operation forbidden: {reason}")]
    OperationForbidden { reason: String },

    #[error("Validation failed with {} violation(s)", .0.violations.len())]
    ValidationFailed(Box<ValidationVerdict>),

    #[error("Publishing version {version_id} requires a validation verdict for it")]
    VerdictMissing { version_id: VersionId },

    #[error("Version {0} not found in entity")]
    VersionNotFound(VersionId),

    #[error("Inconsistent entity: {0}")]
    InconsistentEntity(EntityInconsistency),
}

/// Everything the machine needs to know about a requested transition
#[derive(Debug, Clone, Copy)]
pub struct TransitionInput<'a> {
    pub version_id: VersionId,
    pub target: PublishingStatus,
    pub actor_id: &'a str,
    pub requested_at: DateTime<Utc>,
    /// Verdict for `version_id`; required when publishing
    pub verdict: Option<&'a ValidationVerdict>,
}

/// Pure lifecycle transition table over an entity's version chain.
///
/// The machine never mutates its input: a permitted transition yields a new
/// entity state plus the list of version changes, anything else an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct VersioningStateMachine;

impl VersioningStateMachine {
    pub fn new() -> Self {
        Self
    }

    /// Whether the table has an entry for `(from, to)`.
    ///
    /// Preconditions that depend on the rest of the entity (an existing draft,
    /// live successors, a passing verdict) are checked by [`apply`](Self::apply).
    pub fn is_permitted(from: PublishingStatus, to: PublishingStatus) -> bool {
        matches!(
            (from, to),
            (Draft, Published)
                | (Published, Draft)
                | (Draft, Removed)
                | (Published, Removed)
                | (Removed, Draft)
                | (Removed, Deleted)
        )
    }

    pub fn permitted_targets(from: PublishingStatus) -> Vec<PublishingStatus> {
        PublishingStatus::ALL
            .iter()
            .copied()
            .filter(|to| Self::is_permitted(from, *to))
            .collect()
    }

    pub fn apply(
        &self,
        entity: &LogicalEntity,
        input: TransitionInput<'_>,
    ) -> Result<TransitionResult, TransitionError> {
        entity
            .check_invariants()
            .map_err(TransitionError::InconsistentEntity)?;

        let version = entity
            .version(input.version_id)
            .ok_or(TransitionError::VersionNotFound(input.version_id))?;
        let from = version.status;
        let to = input.target;

        if from == Deleted {
            return Err(TransitionError::OperationForbidden {
                reason: format!("version {} is deleted", version.id),
            });
        }

        let mut next = entity.clone();
        let mut changes = Vec::new();
        let mut created_version = None;

        match (from, to) {
            (Draft, Published) => {
                let verdict = input
                    .verdict
                    .filter(|v| v.version_id == version.id)
                    .ok_or(TransitionError::VerdictMissing {
                        version_id: version.id,
                    })?;
                if !verdict.passed() {
                    return Err(TransitionError::ValidationFailed(Box::new(verdict.clone())));
                }

                if let Some(previous) = entity.published() {
                    set_status(&mut next, previous.id, OldPublished, &input, &mut changes);
                }
                set_status(&mut next, version.id, Published, &input, &mut changes);
            }

            (Published, Draft) => {
                ensure_no_other_draft(entity, version.id)?;

                let draft = Version {
                    id: VersionId::new(),
                    version_number: entity.latest_version_number() + 1,
                    status: Draft,
                    predecessor: Some(version.id),
                    modified_at: input.requested_at,
                    modified_by: Some(input.actor_id.to_string()),
                    ..version.clone()
                };
                changes.push(VersionChange {
                    version_id: draft.id,
                    from: None,
                    to: Draft,
                });
                created_version = Some(draft.id);
                next.versions.push(draft);
            }

            (Draft, Removed) | (Published, Removed) => {
                set_status(&mut next, version.id, Removed, &input, &mut changes);
            }

            (Removed, Draft) => {
                ensure_no_other_draft(entity, version.id)?;
                set_status(&mut next, version.id, Draft, &input, &mut changes);
            }

            (Removed, Deleted) => {
                let successors: Vec<String> = entity
                    .live_successors_of(version.id)
                    .map(|v| v.id.to_string())
                    .collect();
                if !successors.is_empty() {
                    return Err(TransitionError::OperationForbidden {
                        reason: format!(
                            "version {} is still the predecessor of live version(s) {}",
                            version.id,
                            successors.join(", ")
                        ),
                    });
                }
                set_status(&mut next, version.id, Deleted, &input, &mut changes);
            }

            (from, to) => {
                error!(
                    version_id = %version.id,
                    from = %from,
                    to = %to,
                    "Invalid version transition"
                );
                return Err(TransitionError::InvalidTransition { from, to });
            }
        }

        next.check_invariants()
            .map_err(TransitionError::InconsistentEntity)?;
        next.revision = entity.revision + 1;

        let record = TransitionRecord {
            unific_root_id: entity.unific_root_id,
            version_id: version.id,
            from,
            to,
            actor_id: input.actor_id.to_string(),
            timestamp: input.requested_at,
        };

        info!(
            unific_root_id = %record.unific_root_id,
            version_id = %record.version_id,
            from = %record.from,
            to = %record.to,
            actor = %record.actor_id,
            changes = changes.len(),
            "Version transition computed"
        );

        Ok(TransitionResult {
            unific_root_id: entity.unific_root_id,
            entity_type: entity.entity_type,
            version_id: version.id,
            from,
            to,
            entity_status_before: entity.status(),
            entity_status_after: next.status(),
            expected_revision: entity.revision,
            entity: next,
            changes,
            created_version,
            record,
            verdict: input.verdict.cloned().filter(|_| to == Published),
        })
    }
}

fn ensure_no_other_draft(entity: &LogicalEntity, version_id: VersionId) -> Result<(), TransitionError> {
    match entity.draft() {
        Some(draft) if draft.id != version_id => Err(TransitionError::OperationForbidden {
            reason: format!("draft {} already exists", draft.id),
        }),
        _ => Ok(()),
    }
}

fn set_status(
    entity: &mut LogicalEntity,
    version_id: VersionId,
    status: PublishingStatus,
    input: &TransitionInput<'_>,
    changes: &mut Vec<VersionChange>,
) {
    if let Some(version) = entity.version_mut(version_id) {
        changes.push(VersionChange {
            version_id,
            from: Some(version.status),
            to: status,
        });
        version.status = status;
        version.modified_at = input.requested_at;
        version.modified_by = Some(input.actor_id.to_string());
    }
}
