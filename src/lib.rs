// Service directory publishing core
// Hierarchy resolution, completeness validation and version lifecycle
// transitions for organizations, services and service channels

pub mod cli;
pub mod config;
pub mod hierarchy;
pub mod memory;
pub mod model;
pub mod observability;
pub mod publishing;
pub mod telemetry;
pub mod validation;
pub mod versioning;

// Re-export key types for easy access
pub use config::{config, init_config, PublishingConfig};
pub use hierarchy::{build_tree, HierarchyBuild, HierarchyDiagnostic, HierarchyError, OrganizationNode, OrganizationTree};
pub use memory::{DirectorySnapshot, GrantPolicy, InMemoryStore};
pub use model::{
    ActorContext, ActorRole, EntityType, LogicalEntity, NodeStatus, OrganizationId, Payload,
    PublishingStatus, UnificRootId, Version, VersionId,
};
pub use observability::{OperationTimer, PublishingMetrics};
pub use publishing::{
    AuthorizationPolicy, PersistenceError, PersistenceGateway, PublishingError, PublishingManager,
    RetryConfig, TransitionRequest,
};
pub use telemetry::{create_transition_span, generate_correlation_id, init_telemetry};
pub use validation::{CompletenessValidator, RuleRegistry, ValidationVerdict, Violation, ViolationCode};
pub use versioning::{TransitionError, TransitionResult, VersioningStateMachine};
