use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn, Instrument};

use super::errors::PublishingError;
use super::retry::{ConflictRetryHandler, RetryConfig};
use super::traits::{AuthorizationPolicy, PersistenceGateway};
use crate::config::PublishingConfig;
use crate::hierarchy::{build_tree, HierarchyError, OrganizationTree};
use crate::model::{ActorContext, LogicalEntity, PublishingStatus, Version, VersionId};
use crate::observability::{OperationTimer, PublishingMetrics};
use crate::telemetry::{create_transition_span, generate_correlation_id};
use crate::validation::{CompletenessValidator, ValidationVerdict};
use crate::versioning::{TransitionInput, TransitionResult, VersioningStateMachine};

/// A caller's request to move one version to a new status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub version_id: VersionId,
    pub target: PublishingStatus,
    pub actor: ActorContext,
    pub requested_at: DateTime<Utc>,
}

impl TransitionRequest {
    pub fn new(version_id: VersionId, target: PublishingStatus, actor: ActorContext) -> Self {
        Self {
            version_id,
            target,
            actor,
            requested_at: Utc::now(),
        }
    }
}

/// Orchestrates hierarchy resolution, authorization, validation, the state
/// machine and persistence for transition requests.
pub struct PublishingManager {
    store: Arc<dyn PersistenceGateway>,
    authorization: Arc<dyn AuthorizationPolicy>,
    validator: CompletenessValidator,
    machine: VersioningStateMachine,
    retry: ConflictRetryHandler,
    metrics: Arc<PublishingMetrics>,
}

impl std::fmt::Debug for PublishingManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishingManager")
            .field("validator", &self.validator)
            .field("retry", &self.retry)
            .field("metrics", &self.metrics.get_stats())
            .finish_non_exhaustive()
    }
}

impl PublishingManager {
    pub fn new(
        store: Arc<dyn PersistenceGateway>,
        authorization: Arc<dyn AuthorizationPolicy>,
    ) -> Self {
        Self {
            store,
            authorization,
            validator: CompletenessValidator::default(),
            machine: VersioningStateMachine::new(),
            retry: ConflictRetryHandler::default(),
            metrics: Arc::new(PublishingMetrics::new()),
        }
    }

    pub fn from_config(
        store: Arc<dyn PersistenceGateway>,
        authorization: Arc<dyn AuthorizationPolicy>,
        config: &PublishingConfig,
    ) -> Self {
        Self::new(store, authorization)
            .with_validator(CompletenessValidator::from_config(&config.validation))
            .with_retry(config.retry.clone())
    }

    pub fn with_validator(mut self, validator: CompletenessValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_retry(mut self, config: RetryConfig) -> Self {
        self.retry = ConflictRetryHandler::new(config);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<PublishingMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &PublishingMetrics {
        &self.metrics
    }

    /// Run the full pipeline and persist the outcome.
    ///
    /// A lost concurrency race re-runs everything on a fresh snapshot, up to
    /// the configured number of attempts.
    pub async fn request_transition(
        &self,
        request: TransitionRequest,
    ) -> Result<TransitionResult, PublishingError> {
        let correlation_id = generate_correlation_id();
        let span = create_transition_span(
            "request_transition",
            &request.version_id.to_string(),
            request.target.as_str(),
            &request.actor.actor_id,
            &correlation_id,
        );

        async {
            let timer = OperationTimer::new("request_transition");
            self.metrics.record_request();

            let outcome = self
                .retry
                .execute(|attempt| {
                    if attempt > 1 {
                        self.metrics.record_retry();
                    }
                    self.attempt_transition(&request)
                })
                .await;

            match &outcome {
                Ok(result) => {
                    self.metrics.record_success();
                    info!(
                        unific_root_id = %result.unific_root_id,
                        from = %result.from,
                        to = %result.to,
                        entity_status = %result.entity_status_after,
                        "Transition persisted"
                    );
                }
                Err(err) => {
                    self.metrics.record_failure();
                    warn!(error = %err, kind = err.kind(), "Transition rejected");
                }
            }
            timer.finish();
            outcome
        }
        .instrument(span)
        .await
    }

    /// Compute the outcome of a transition without persisting it
    pub async fn plan_transition(
        &self,
        request: &TransitionRequest,
    ) -> Result<TransitionResult, PublishingError> {
        let correlation_id = generate_correlation_id();
        let span = create_transition_span(
            "plan_transition",
            &request.version_id.to_string(),
            request.target.as_str(),
            &request.actor.actor_id,
            &correlation_id,
        );

        async {
            self.metrics.record_plan();
            self.compute(request).await
        }
        .instrument(span)
        .await
    }

    /// Validate a version against the current hierarchy, outside any transition
    pub async fn validate_version(
        &self,
        version_id: VersionId,
    ) -> Result<ValidationVerdict, PublishingError> {
        let version = self
            .store
            .load_version(version_id)
            .await?
            .ok_or(PublishingError::VersionNotFound(version_id))?;
        let tree = self.load_tree(&version).await?;
        Ok(self.validator.validate(&version, &tree))
    }

    async fn attempt_transition(
        &self,
        request: &TransitionRequest,
    ) -> Result<TransitionResult, PublishingError> {
        let result = self.compute(request).await?;
        self.store.persist(&result).await?;
        Ok(result)
    }

    async fn compute(&self, request: &TransitionRequest) -> Result<TransitionResult, PublishingError> {
        let (entity, version) = self.load_snapshot(request.version_id).await?;
        let tree = self.load_tree(&version).await?;

        if version.status == PublishingStatus::Deleted {
            return Err(PublishingError::OperationForbidden {
                reason: format!("version {} is deleted", version.id),
            });
        }

        if !self
            .authorization
            .can_actor_transition(&request.actor, &version, request.target)
            .await
        {
            return Err(PublishingError::OperationForbidden {
                reason: format!(
                    "actor {} may not move version {} to {}",
                    request.actor.actor_id, version.id, request.target
                ),
            });
        }

        let verdict = if request.target == PublishingStatus::Published
            && VersioningStateMachine::is_permitted(version.status, request.target)
        {
            let verdict = self.validator.validate(&version, &tree);
            if !verdict.passed() {
                self.metrics.record_validation_failure();
                warn!(
                    version_id = %version.id,
                    violations = verdict.violations.len(),
                    fields = ?verdict.fields(),
                    "Version failed completeness validation"
                );
                return Err(PublishingError::ValidationFailed(Box::new(verdict)));
            }
            Some(verdict)
        } else {
            None
        };

        let result = self.machine.apply(
            &entity,
            TransitionInput {
                version_id: version.id,
                target: request.target,
                actor_id: &request.actor.actor_id,
                requested_at: request.requested_at,
                verdict: verdict.as_ref(),
            },
        )?;
        Ok(result)
    }

    async fn load_snapshot(
        &self,
        version_id: VersionId,
    ) -> Result<(LogicalEntity, Version), PublishingError> {
        let version = self
            .store
            .load_version(version_id)
            .await?
            .ok_or(PublishingError::VersionNotFound(version_id))?;
        let entity = self
            .store
            .load_entity(version.unific_root_id)
            .await?
            .ok_or(PublishingError::EntityNotFound(version.unific_root_id))?;

        // The entity snapshot is authoritative for the version's status
        let version = entity
            .version(version_id)
            .cloned()
            .ok_or(PublishingError::VersionNotFound(version_id))?;
        Ok((entity, version))
    }

    async fn load_tree(&self, version: &Version) -> Result<OrganizationTree, PublishingError> {
        let nodes = self.store.load_hierarchy(Some(version.organization_id)).await?;

        match build_tree(nodes) {
            Ok(build) => {
                for diagnostic in &build.diagnostics {
                    warn!(diagnostic = %diagnostic, "Organization hierarchy diagnostic");
                }
                Ok(build.tree)
            }
            Err(err) => {
                if let HierarchyError::CycleDetected { nodes } = &err {
                    error!(
                        members = ?nodes.iter().map(ToString::to_string).collect::<Vec<_>>(),
                        "Cycle detected in organization hierarchy"
                    );
                } else {
                    error!(error = %err, "Organization hierarchy could not be resolved");
                }
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::OrganizationNode;
    use crate::model::*;
    use crate::publishing::errors::PersistenceError;
    use crate::publishing::traits::{MockAuthorizationPolicy, MockPersistenceGateway};
    use crate::validation::ViolationCode;

    const ORG: u128 = 1;
    const ROOT: u128 = 100;

    fn complete_service() -> ServicePayload {
        ServicePayload {
            name: LocalizedText::new().with("fi", "Kirjastokortti"),
            summary: LocalizedText::new().with("fi", "Kortin hakeminen"),
            description: LocalizedText::new().with("fi", "Kirjastokortilla lainaat aineistoa."),
            service_classes: vec!["P5.1".to_string()],
            target_groups: vec!["KR1".to_string()],
            charge_type: Some(ChargeType::Free),
            ..Default::default()
        }
    }

    fn version(number: u32, status: PublishingStatus, payload: ServicePayload) -> Version {
        Version {
            id: VersionId::from_u128(number as u128),
            unific_root_id: UnificRootId::from_u128(ROOT),
            entity_type: EntityType::Service,
            version_number: number,
            status,
            payload: Payload::Service(payload),
            organization_id: OrganizationId::from_u128(ORG),
            predecessor: None,
            modified_at: Utc::now(),
            modified_by: None,
        }
    }

    fn entity(versions: Vec<Version>) -> LogicalEntity {
        LogicalEntity {
            unific_root_id: UnificRootId::from_u128(ROOT),
            entity_type: EntityType::Service,
            revision: 1,
            versions,
        }
    }

    fn store_with(entity: LogicalEntity, nodes: Vec<OrganizationNode>) -> MockPersistenceGateway {
        let mut store = MockPersistenceGateway::new();
        let for_versions = entity.clone();
        store
            .expect_load_version()
            .returning(move |id| Ok(for_versions.version(id).cloned()));
        store
            .expect_load_entity()
            .returning(move |_| Ok(Some(entity.clone())));
        store
            .expect_load_hierarchy()
            .returning(move |_| Ok(nodes.clone()));
        store
    }

    fn allow_all() -> MockAuthorizationPolicy {
        let mut policy = MockAuthorizationPolicy::new();
        policy.expect_can_actor_transition().return_const(true);
        policy
    }

    fn request(id: u128, target: PublishingStatus) -> TransitionRequest {
        TransitionRequest::new(
            VersionId::from_u128(id),
            target,
            ActorContext::new("editor-1", ActorRole::Maintainer),
        )
    }

    fn org_nodes() -> Vec<OrganizationNode> {
        vec![OrganizationNode::root(OrganizationId::from_u128(ORG))]
    }

    #[tokio::test]
    async fn publish_persists_demotion() {
        let snapshot = entity(vec![
            version(1, PublishingStatus::Published, complete_service()),
            version(2, PublishingStatus::Draft, complete_service()),
        ]);
        let mut store = store_with(snapshot, org_nodes());
        store
            .expect_persist()
            .withf(|result| result.expected_revision == 1 && result.changes.len() == 2)
            .times(1)
            .returning(|_| Ok(()));

        let manager = PublishingManager::new(Arc::new(store), Arc::new(allow_all()));
        let result = manager
            .request_transition(request(2, PublishingStatus::Published))
            .await
            .unwrap();

        assert_eq!(
            result.entity.version(VersionId::from_u128(1)).unwrap().status,
            PublishingStatus::OldPublished
        );
        assert_eq!(manager.metrics().get_stats().succeeded, 1);
    }

    #[tokio::test]
    async fn incomplete_draft_is_not_persisted() {
        let mut payload = complete_service();
        payload.summary = LocalizedText::new();
        let snapshot = entity(vec![version(1, PublishingStatus::Draft, payload)]);
        let mut store = store_with(snapshot, org_nodes());
        store.expect_persist().never();

        let manager = PublishingManager::new(Arc::new(store), Arc::new(allow_all()));
        let err = manager
            .request_transition(request(1, PublishingStatus::Published))
            .await
            .unwrap_err();

        match err {
            PublishingError::ValidationFailed(verdict) => {
                assert_eq!(verdict.fields(), vec!["summary"]);
                assert_eq!(verdict.violations[0].code, ViolationCode::MissingField);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(manager.metrics().get_stats().validation_failures, 1);
    }

    #[tokio::test]
    async fn unauthorized_actor_is_forbidden() {
        let snapshot = entity(vec![version(1, PublishingStatus::Draft, complete_service())]);
        let mut store = store_with(snapshot, org_nodes());
        store.expect_persist().never();

        let mut policy = MockAuthorizationPolicy::new();
        policy.expect_can_actor_transition().return_const(false);

        let manager = PublishingManager::new(Arc::new(store), Arc::new(policy));
        let err = manager
            .request_transition(request(1, PublishingStatus::Removed))
            .await
            .unwrap_err();
        assert!(matches!(err, PublishingError::OperationForbidden { .. }));
    }

    #[tokio::test]
    async fn deleted_source_is_rejected_before_authorization() {
        let snapshot = entity(vec![version(1, PublishingStatus::Deleted, complete_service())]);
        let store = store_with(snapshot, org_nodes());

        let mut policy = MockAuthorizationPolicy::new();
        policy.expect_can_actor_transition().never();

        let manager = PublishingManager::new(Arc::new(store), Arc::new(policy));
        let err = manager
            .request_transition(request(1, PublishingStatus::Draft))
            .await
            .unwrap_err();
        assert!(matches!(err, PublishingError::OperationForbidden { .. }));
    }

    #[tokio::test]
    async fn cyclic_hierarchy_aborts_transition() {
        let a = OrganizationId::from_u128(ORG);
        let b = OrganizationId::from_u128(2);
        let snapshot = entity(vec![version(1, PublishingStatus::Draft, complete_service())]);
        let mut store = store_with(
            snapshot,
            vec![OrganizationNode::child(a, b), OrganizationNode::child(b, a)],
        );
        store.expect_persist().never();

        let manager = PublishingManager::new(Arc::new(store), Arc::new(allow_all()));
        let err = manager
            .request_transition(request(1, PublishingStatus::Removed))
            .await
            .unwrap_err();
        assert_eq!(err, PublishingError::CycleDetected { nodes: vec![a, b] });
    }

    #[tokio::test]
    async fn cycle_is_reported_before_authorization() {
        let a = OrganizationId::from_u128(ORG);
        let b = OrganizationId::from_u128(2);
        let snapshot = entity(vec![version(1, PublishingStatus::Draft, complete_service())]);
        let mut store = store_with(
            snapshot,
            vec![OrganizationNode::child(a, b), OrganizationNode::child(b, a)],
        );
        store.expect_persist().never();

        let mut policy = MockAuthorizationPolicy::new();
        policy.expect_can_actor_transition().never();

        let manager = PublishingManager::new(Arc::new(store), Arc::new(policy));
        let err = manager
            .request_transition(request(1, PublishingStatus::Removed))
            .await
            .unwrap_err();
        assert_eq!(err, PublishingError::CycleDetected { nodes: vec![a, b] });
    }

    #[tokio::test]
    async fn conflicts_are_retried_then_reported() {
        let snapshot = entity(vec![version(1, PublishingStatus::Draft, complete_service())]);
        let mut store = store_with(snapshot, org_nodes());
        store.expect_persist().times(3).returning(|result| {
            Err(PersistenceError::ConcurrencyConflict {
                entity: result.unific_root_id,
                expected_revision: result.expected_revision,
            })
        });

        let manager = PublishingManager::new(Arc::new(store), Arc::new(allow_all()))
            .with_retry(RetryConfig::immediate(3));
        let err = manager
            .request_transition(request(1, PublishingStatus::Removed))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            PublishingError::ConcurrencyConflict {
                entity: UnificRootId::from_u128(ROOT),
                attempts: 3
            }
        );
        let stats = manager.metrics().get_stats();
        assert_eq!(stats.retried, 2);
        assert_eq!(stats.failed, 1);
    }

    #[tokio::test]
    async fn plan_never_persists() {
        let snapshot = entity(vec![version(1, PublishingStatus::Published, complete_service())]);
        let mut store = store_with(snapshot, org_nodes());
        store.expect_persist().never();

        let manager = PublishingManager::new(Arc::new(store), Arc::new(allow_all()));
        let plan = manager
            .plan_transition(&request(1, PublishingStatus::Draft))
            .await
            .unwrap();
        assert!(plan.created_version.is_some());
        assert_eq!(plan.entity_status_after, PublishingStatus::Modified);
    }

    #[tokio::test]
    async fn validate_version_reports_archived_scope() {
        let snapshot = entity(vec![version(1, PublishingStatus::Draft, complete_service())]);
        let store = store_with(
            snapshot,
            vec![OrganizationNode::root(OrganizationId::from_u128(ORG)).with_status(NodeStatus::Archived)],
        );

        let manager = PublishingManager::new(Arc::new(store), Arc::new(allow_all()));
        let verdict = manager.validate_version(VersionId::from_u128(1)).await.unwrap();
        assert!(verdict.has_code(ViolationCode::OrganizationArchived));
    }

    #[tokio::test]
    async fn missing_version() {
        let mut store = MockPersistenceGateway::new();
        store.expect_load_version().returning(|_| Ok(None));

        let manager = PublishingManager::new(Arc::new(store), Arc::new(allow_all()));
        let err = manager
            .request_transition(request(9, PublishingStatus::Removed))
            .await
            .unwrap_err();
        assert_eq!(err, PublishingError::VersionNotFound(VersionId::from_u128(9)));
    }
}
