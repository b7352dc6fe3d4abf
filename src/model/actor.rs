// Who is asking for a transition

use serde::{Deserialize, Serialize};

use super::ids::OrganizationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// Maintains content across every organization
    Administrator,
    /// Maintains content of their own organizations
    #[default]
    Maintainer,
    /// Read-only access
    Viewer,
}

/// Identity and organization memberships of the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    pub actor_id: String,
    #[serde(default)]
    pub role: ActorRole,
    #[serde(default)]
    pub organizations: Vec<OrganizationId>,
}

impl ActorContext {
    pub fn new(actor_id: impl Into<String>, role: ActorRole) -> Self {
        Self {
            actor_id: actor_id.into(),
            role,
            organizations: Vec::new(),
        }
    }

    pub fn with_organization(mut self, organization: OrganizationId) -> Self {
        self.organizations.push(organization);
        self
    }
}
