// Domain model for versioned directory entities

pub mod actor;
pub mod entity;
pub mod ids;
pub mod payload;
pub mod status;

pub use actor::{ActorContext, ActorRole};
pub use entity::{EntityInconsistency, LogicalEntity, Version};
pub use ids::{OrganizationId, UnificRootId, VersionId};
pub use payload::{
    ChannelKind, ChannelPayload, ChargeType, LocalizedText, OrganizationPayload, OrganizationType,
    Payload, ServicePayload, ServiceType,
};
pub use status::{EntityType, NodeStatus, PublishingStatus};
