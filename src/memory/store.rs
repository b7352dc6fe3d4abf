use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::snapshot::{DirectorySnapshot, SnapshotError};
use crate::hierarchy::OrganizationNode;
use crate::model::{LogicalEntity, OrganizationId, UnificRootId, Version, VersionId};
use crate::publishing::{PersistenceError, PersistenceGateway};
use crate::versioning::{TransitionRecord, TransitionResult};

#[derive(Debug, Default)]
struct StoreState {
    organizations: Vec<OrganizationNode>,
    entities: BTreeMap<UnificRootId, LogicalEntity>,
    version_index: HashMap<VersionId, UnificRootId>,
    history: Vec<TransitionRecord>,
}

impl StoreState {
    fn index(&mut self, entity: &LogicalEntity) {
        for version in &entity.versions {
            self.version_index.insert(version.id, entity.unific_root_id);
        }
    }
}

/// Snapshot-backed persistence with per-entity revision checks
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
    simulated_conflicts: AtomicU32,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: DirectorySnapshot) -> Result<Self, SnapshotError> {
        let mut state = StoreState {
            organizations: snapshot.organizations,
            history: snapshot.history,
            ..Default::default()
        };

        for entity in snapshot.entities {
            if state.entities.contains_key(&entity.unific_root_id) {
                return Err(SnapshotError::Corrupt {
                    reason: format!("entity {} appears more than once", entity.unific_root_id),
                });
            }
            if let Some(version) = entity
                .versions
                .iter()
                .find(|v| state.version_index.contains_key(&v.id))
            {
                return Err(SnapshotError::Corrupt {
                    reason: format!("version {} belongs to more than one entity", version.id),
                });
            }
            state.index(&entity);
            state.entities.insert(entity.unific_root_id, entity);
        }

        Ok(Self {
            state: RwLock::new(state),
            simulated_conflicts: AtomicU32::new(0),
        })
    }

    /// Make the next `count` persists lose a race against another writer
    pub fn simulate_conflicts(&self, count: u32) {
        self.simulated_conflicts.store(count, Ordering::SeqCst);
    }

    pub async fn insert_entity(&self, entity: LogicalEntity) {
        let mut state = self.state.write().await;
        state.index(&entity);
        state.entities.insert(entity.unific_root_id, entity);
    }

    pub async fn insert_organization(&self, node: OrganizationNode) {
        self.state.write().await.organizations.push(node);
    }

    pub async fn entity(&self, id: UnificRootId) -> Option<LogicalEntity> {
        self.state.read().await.entities.get(&id).cloned()
    }

    pub async fn entities(&self) -> Vec<LogicalEntity> {
        self.state.read().await.entities.values().cloned().collect()
    }

    pub async fn history(&self) -> Vec<TransitionRecord> {
        self.state.read().await.history.clone()
    }

    /// Current state; actors are not tracked by the store and are left empty
    pub async fn to_snapshot(&self) -> DirectorySnapshot {
        let state = self.state.read().await;
        DirectorySnapshot {
            organizations: state.organizations.clone(),
            entities: state.entities.values().cloned().collect(),
            actors: Vec::new(),
            history: state.history.clone(),
        }
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryStore {
    /// The whole hierarchy is returned regardless of scope, so cycles and
    /// conflicting parents anywhere in the snapshot surface on every request
    async fn load_hierarchy(
        &self,
        _scope: Option<OrganizationId>,
    ) -> Result<Vec<OrganizationNode>, PersistenceError> {
        Ok(self.state.read().await.organizations.clone())
    }

    async fn load_version(&self, id: VersionId) -> Result<Option<Version>, PersistenceError> {
        let state = self.state.read().await;
        Ok(state
            .version_index
            .get(&id)
            .and_then(|root| state.entities.get(root))
            .and_then(|entity| entity.version(id))
            .cloned())
    }

    async fn load_entity(&self, id: UnificRootId) -> Result<Option<LogicalEntity>, PersistenceError> {
        Ok(self.entity(id).await)
    }

    async fn persist(&self, result: &TransitionResult) -> Result<(), PersistenceError> {
        let mut state = self.state.write().await;

        let stored = state
            .entities
            .get_mut(&result.unific_root_id)
            .ok_or_else(|| PersistenceError::NotFound(format!("entity {}", result.unific_root_id)))?;

        let pending = self.simulated_conflicts.load(Ordering::SeqCst);
        if pending > 0 {
            self.simulated_conflicts.store(pending - 1, Ordering::SeqCst);
            // Another writer got there first
            stored.revision += 1;
        }

        if stored.revision != result.expected_revision {
            warn!(
                entity = %result.unific_root_id,
                expected = result.expected_revision,
                found = stored.revision,
                "Revision mismatch on persist"
            );
            return Err(PersistenceError::ConcurrencyConflict {
                entity: result.unific_root_id,
                expected_revision: result.expected_revision,
            });
        }

        let mut next = result.entity.clone();
        next.revision = result.expected_revision + 1;
        *stored = next.clone();
        state.index(&next);
        state.history.push(result.record.clone());

        debug!(
            entity = %result.unific_root_id,
            revision = next.revision,
            "Persisted transition"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Payload, PublishingStatus, ServicePayload};
    use crate::versioning::{TransitionInput, VersioningStateMachine};
    use chrono::Utc;

    fn snapshot() -> (DirectorySnapshot, VersionId) {
        let version = Version::first_draft(
            UnificRootId::from_u128(10),
            OrganizationId::from_u128(1),
            Payload::Service(ServicePayload::default()),
            Utc::now(),
        );
        let id = version.id;
        let snapshot = DirectorySnapshot {
            organizations: vec![OrganizationNode::root(OrganizationId::from_u128(1))],
            entities: vec![LogicalEntity::new(version)],
            ..Default::default()
        };
        (snapshot, id)
    }

    fn remove(entity: &LogicalEntity, id: VersionId) -> TransitionResult {
        VersioningStateMachine
            .apply(
                entity,
                TransitionInput {
                    version_id: id,
                    target: PublishingStatus::Removed,
                    actor_id: "editor-1",
                    requested_at: Utc::now(),
                    verdict: None,
                },
            )
            .unwrap()
    }

    #[tokio::test]
    async fn persist_bumps_revision_and_records_history() {
        let (snapshot, id) = snapshot();
        let store = InMemoryStore::from_snapshot(snapshot).unwrap();
        let entity = store.entity(UnificRootId::from_u128(10)).await.unwrap();

        store.persist(&remove(&entity, id)).await.unwrap();

        let stored = store.load_entity(entity.unific_root_id).await.unwrap().unwrap();
        assert_eq!(stored.revision, 1);
        assert_eq!(stored.versions[0].status, PublishingStatus::Removed);
        assert_eq!(store.history().await.len(), 1);
    }

    #[tokio::test]
    async fn stale_revision_is_a_conflict() {
        let (snapshot, id) = snapshot();
        let store = InMemoryStore::from_snapshot(snapshot).unwrap();
        let entity = store.entity(UnificRootId::from_u128(10)).await.unwrap();
        let result = remove(&entity, id);

        store.persist(&result).await.unwrap();
        let err = store.persist(&result).await.unwrap_err();
        assert!(matches!(err, PersistenceError::ConcurrencyConflict { .. }));
    }

    #[tokio::test]
    async fn simulated_conflict_fails_once() {
        let (snapshot, id) = snapshot();
        let store = InMemoryStore::from_snapshot(snapshot).unwrap();
        store.simulate_conflicts(1);

        let entity = store.entity(UnificRootId::from_u128(10)).await.unwrap();
        assert!(store.persist(&remove(&entity, id)).await.is_err());

        let fresh = store.entity(UnificRootId::from_u128(10)).await.unwrap();
        assert_eq!(fresh.revision, 1);
        store.persist(&remove(&fresh, id)).await.unwrap();
    }

    #[test]
    fn duplicate_entities_are_rejected() {
        let (mut snapshot, _) = snapshot();
        snapshot.entities.push(snapshot.entities[0].clone());
        assert!(matches!(
            InMemoryStore::from_snapshot(snapshot),
            Err(SnapshotError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn snapshot_file_round_trips_through_store() {
        let (snapshot, _) = snapshot();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("directory.json");
        snapshot.save(&path).await.unwrap();

        let loaded = DirectorySnapshot::load(&path).await.unwrap();
        let store = InMemoryStore::from_snapshot(loaded).unwrap();
        assert_eq!(store.to_snapshot().await.entities, snapshot.entities);
    }
}
