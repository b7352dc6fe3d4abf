use async_trait::async_trait;
use tracing::debug;

use crate::hierarchy::{build_tree, HierarchyError, OrganizationNode, OrganizationTree};
use crate::model::{ActorContext, ActorRole, PublishingStatus, Version};
use crate::publishing::AuthorizationPolicy;

/// Static grants: a maintainer may act on versions owned by a granted
/// organization or any of its sub-organizations.
#[derive(Debug, Clone, Default)]
pub struct GrantPolicy {
    tree: OrganizationTree,
}

impl GrantPolicy {
    pub fn new(tree: OrganizationTree) -> Self {
        Self { tree }
    }

    pub fn from_nodes(nodes: Vec<OrganizationNode>) -> Result<Self, HierarchyError> {
        Ok(Self::new(build_tree(nodes)?.tree))
    }

    pub fn is_granted(&self, actor: &ActorContext, version: &Version) -> bool {
        match actor.role {
            ActorRole::Administrator => true,
            ActorRole::Viewer => false,
            ActorRole::Maintainer => actor.organizations.iter().any(|granted| {
                *granted == version.organization_id
                    || self.tree.is_descendant_of(version.organization_id, *granted)
            }),
        }
    }
}

#[async_trait]
impl AuthorizationPolicy for GrantPolicy {
    async fn can_actor_transition(
        &self,
        actor: &ActorContext,
        version: &Version,
        target: PublishingStatus,
    ) -> bool {
        let allowed = self.is_granted(actor, version);
        debug!(
            actor = %actor.actor_id,
            organization = %version.organization_id,
            target = %target,
            allowed,
            "Authorization decision"
        );
        allowed
    }
}
