// End-to-end publishing workflow over the in-memory adapters

use chrono::Utc;
use servicedir_publishing::memory::{DirectorySnapshot, GrantPolicy, InMemoryStore};
use servicedir_publishing::model::{
    ActorContext, ActorRole, ChargeType, LocalizedText, LogicalEntity, OrganizationId, Payload,
    PublishingStatus, ServicePayload, UnificRootId, Version, VersionId,
};
use servicedir_publishing::publishing::{PublishingError, PublishingManager, RetryConfig, TransitionRequest};
use servicedir_publishing::validation::ViolationCode;
use servicedir_publishing::OrganizationNode;
use std::sync::Arc;

const CITY: u128 = 1;
const LIBRARY: u128 = 2;

fn org(n: u128) -> OrganizationId {
    OrganizationId::from_u128(n)
}

fn library_card() -> ServicePayload {
    ServicePayload {
        name: LocalizedText::new().with("fi", "Kirjastokortti").with("sv", "Bibliotekskort"),
        summary: LocalizedText::new().with("fi", "Hae kirjastokorttia"),
        description: LocalizedText::new().with("fi", "Kirjastokortilla voit lainata aineistoa."),
        service_classes: vec!["P5.1".to_string()],
        target_groups: vec!["KR1".to_string()],
        charge_type: Some(ChargeType::Free),
        ..Default::default()
    }
}

fn version(id: u128, number: u32, status: PublishingStatus, payload: ServicePayload) -> Version {
    Version {
        id: VersionId::from_u128(id),
        unific_root_id: UnificRootId::from_u128(500),
        entity_type: servicedir_publishing::EntityType::Service,
        version_number: number,
        status,
        payload: Payload::Service(payload),
        organization_id: org(LIBRARY),
        predecessor: None,
        modified_at: Utc::now(),
        modified_by: None,
    }
}

fn organizations() -> Vec<OrganizationNode> {
    vec![
        OrganizationNode::root(org(CITY)).with_name("Esimerkkikaupunki"),
        OrganizationNode::child(org(LIBRARY), org(CITY)).with_name("Kaupunginkirjasto"),
    ]
}

fn editor() -> ActorContext {
    ActorContext::new("editor-1", ActorRole::Maintainer).with_organization(org(CITY))
}

fn setup(versions: Vec<Version>) -> (Arc<InMemoryStore>, PublishingManager) {
    let policy = GrantPolicy::from_nodes(organizations()).unwrap();
    setup_with(versions, organizations(), policy)
}

fn setup_with(
    versions: Vec<Version>,
    organizations: Vec<OrganizationNode>,
    policy: GrantPolicy,
) -> (Arc<InMemoryStore>, PublishingManager) {
    let entity = LogicalEntity {
        unific_root_id: UnificRootId::from_u128(500),
        entity_type: servicedir_publishing::EntityType::Service,
        revision: 0,
        versions,
    };
    let snapshot = DirectorySnapshot {
        organizations,
        entities: vec![entity],
        ..Default::default()
    };
    let store = Arc::new(InMemoryStore::from_snapshot(snapshot).unwrap());
    let manager = PublishingManager::new(store.clone(), Arc::new(policy))
        .with_retry(RetryConfig::immediate(3));
    (store, manager)
}

async fn stored_status(store: &InMemoryStore, id: u128) -> PublishingStatus {
    store
        .entity(UnificRootId::from_u128(500))
        .await
        .unwrap()
        .version(VersionId::from_u128(id))
        .unwrap()
        .status
}

#[tokio::test]
async fn incomplete_draft_stays_draft() {
    let mut payload = library_card();
    payload.description = LocalizedText::new();
    let (store, manager) = setup(vec![version(1, 1, PublishingStatus::Draft, payload)]);

    let err = manager
        .request_transition(TransitionRequest::new(
            VersionId::from_u128(1),
            PublishingStatus::Published,
            editor(),
        ))
        .await
        .unwrap_err();

    let PublishingError::ValidationFailed(verdict) = err else {
        panic!("expected a validation failure, got {err}");
    };
    assert_eq!(verdict.violations.len(), 1);
    assert_eq!(verdict.violations[0].field_path, "description");
    assert_eq!(verdict.violations[0].code, ViolationCode::MissingField);
    assert_eq!(stored_status(&store, 1).await, PublishingStatus::Draft);
    assert!(store.history().await.is_empty());
}

#[tokio::test]
async fn publishing_sibling_draft_demotes_published_version() {
    let (store, manager) = setup(vec![
        version(1, 1, PublishingStatus::Published, library_card()),
        version(2, 2, PublishingStatus::Draft, library_card()),
    ]);

    let result = manager
        .request_transition(TransitionRequest::new(
            VersionId::from_u128(2),
            PublishingStatus::Published,
            editor(),
        ))
        .await
        .unwrap();

    assert_eq!(result.entity_status_before, PublishingStatus::Modified);
    assert_eq!(stored_status(&store, 1).await, PublishingStatus::OldPublished);
    assert_eq!(stored_status(&store, 2).await, PublishingStatus::Published);

    let entity = store.entity(UnificRootId::from_u128(500)).await.unwrap();
    assert_eq!(entity.versions_in(PublishingStatus::Published).count(), 1);
    assert_eq!(entity.revision, 1);
    assert_eq!(store.history().await.len(), 1);
}

#[tokio::test]
async fn cyclic_hierarchy_blocks_every_transition() {
    let root = org(CITY);
    let a = org(10);
    let b = org(11);
    let (store, manager) = setup_with(
        vec![version(1, 1, PublishingStatus::Draft, library_card())],
        vec![
            OrganizationNode::root(root),
            OrganizationNode::child(a, root),
            OrganizationNode::child(b, a),
            OrganizationNode::child(a, b),
        ],
        // Grants as they stood before the cycle was introduced
        GrantPolicy::from_nodes(organizations()).unwrap(),
    );

    let err = manager
        .request_transition(TransitionRequest::new(
            VersionId::from_u128(1),
            PublishingStatus::Removed,
            editor(),
        ))
        .await
        .unwrap_err();

    assert_eq!(err, PublishingError::CycleDetected { nodes: vec![a, b] });
    assert_eq!(stored_status(&store, 1).await, PublishingStatus::Draft);
}

#[tokio::test]
async fn cycle_in_another_branch_is_reported_to_a_granted_maintainer() {
    let mut nodes = organizations();
    nodes.push(OrganizationNode::child(org(10), org(11)));
    nodes.push(OrganizationNode::child(org(11), org(10)));
    let (store, manager) = setup_with(
        vec![version(1, 1, PublishingStatus::Draft, library_card())],
        nodes,
        GrantPolicy::from_nodes(organizations()).unwrap(),
    );

    let err = manager
        .request_transition(TransitionRequest::new(
            VersionId::from_u128(1),
            PublishingStatus::Removed,
            editor(),
        ))
        .await
        .unwrap_err();

    assert_eq!(err, PublishingError::CycleDetected { nodes: vec![org(10), org(11)] });
    assert!(store.history().await.is_empty());
}

#[tokio::test]
async fn deleting_a_predecessor_of_a_live_version_is_forbidden() {
    let mut successor = version(2, 2, PublishingStatus::Draft, library_card());
    successor.predecessor = Some(VersionId::from_u128(1));
    let (store, manager) = setup(vec![
        version(1, 1, PublishingStatus::Removed, library_card()),
        successor,
    ]);

    let err = manager
        .request_transition(TransitionRequest::new(
            VersionId::from_u128(1),
            PublishingStatus::Deleted,
            editor(),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, PublishingError::OperationForbidden { .. }));
    assert_eq!(stored_status(&store, 1).await, PublishingStatus::Removed);
}

#[tokio::test]
async fn full_lifecycle_keeps_a_single_published_version() {
    let (store, manager) = setup(vec![version(1, 1, PublishingStatus::Draft, library_card())]);
    let request = |id: VersionId, target| TransitionRequest::new(id, target, editor());

    manager
        .request_transition(request(VersionId::from_u128(1), PublishingStatus::Published))
        .await
        .unwrap();

    let edit = manager
        .request_transition(request(VersionId::from_u128(1), PublishingStatus::Draft))
        .await
        .unwrap();
    let draft_id = edit.created_version.unwrap();

    manager
        .request_transition(request(draft_id, PublishingStatus::Published))
        .await
        .unwrap();

    let entity = store.entity(UnificRootId::from_u128(500)).await.unwrap();
    assert_eq!(entity.status(), PublishingStatus::Published);
    assert_eq!(entity.published().unwrap().id, draft_id);
    assert_eq!(stored_status(&store, 1).await, PublishingStatus::OldPublished);
    assert_eq!(entity.revision, 3);
    assert_eq!(store.history().await.len(), 3);
}

#[tokio::test]
async fn lost_race_is_retried_on_a_fresh_snapshot() {
    let (store, manager) = setup(vec![version(1, 1, PublishingStatus::Draft, library_card())]);
    store.simulate_conflicts(2);

    let result = manager
        .request_transition(TransitionRequest::new(
            VersionId::from_u128(1),
            PublishingStatus::Removed,
            editor(),
        ))
        .await
        .unwrap();

    assert_eq!(result.expected_revision, 2);
    assert_eq!(manager.metrics().get_stats().retried, 2);
    assert_eq!(stored_status(&store, 1).await, PublishingStatus::Removed);
}

#[tokio::test]
async fn persistent_conflicts_surface_after_bounded_attempts() {
    let (store, manager) = setup(vec![version(1, 1, PublishingStatus::Draft, library_card())]);
    store.simulate_conflicts(10);

    let err = manager
        .request_transition(TransitionRequest::new(
            VersionId::from_u128(1),
            PublishingStatus::Removed,
            editor(),
        ))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        PublishingError::ConcurrencyConflict {
            entity: UnificRootId::from_u128(500),
            attempts: 3
        }
    );
}

#[tokio::test]
async fn maintainer_outside_the_branch_is_forbidden() {
    let nodes = vec![
        OrganizationNode::root(org(CITY)),
        OrganizationNode::child(org(LIBRARY), org(CITY)),
        OrganizationNode::root(org(99)),
    ];
    let policy = GrantPolicy::from_nodes(nodes.clone()).unwrap();
    let (_, manager) = setup_with(
        vec![version(1, 1, PublishingStatus::Draft, library_card())],
        nodes,
        policy,
    );
    let outsider = ActorContext::new("outsider", ActorRole::Maintainer).with_organization(org(99));

    let err = manager
        .request_transition(TransitionRequest::new(
            VersionId::from_u128(1),
            PublishingStatus::Removed,
            outsider,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, PublishingError::OperationForbidden { .. }));
}
