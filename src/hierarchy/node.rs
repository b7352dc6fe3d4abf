use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::{NodeStatus, OrganizationId};

/// One organization as declared by the persistence layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationNode {
    pub id: OrganizationId,
    /// `None` marks a root
    #[serde(default)]
    pub parent_id: Option<OrganizationId>,
    #[serde(default)]
    pub status: NodeStatus,
    #[serde(default)]
    pub name: Option<String>,
}

impl OrganizationNode {
    pub fn root(id: OrganizationId) -> Self {
        Self {
            id,
            parent_id: None,
            status: NodeStatus::Active,
            name: None,
        }
    }

    pub fn child(id: OrganizationId, parent_id: OrganizationId) -> Self {
        Self {
            id,
            parent_id: Some(parent_id),
            status: NodeStatus::Active,
            name: None,
        }
    }

    pub fn with_status(mut self, status: NodeStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

/// Non-fatal findings reported next to a successfully built tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HierarchyDiagnostic {
    /// Parent id set but absent from the snapshot; the node became a root
    OrphanedNode {
        node: OrganizationId,
        missing_parent: OrganizationId,
    },
    /// Same relation declared more than once
    DuplicateNode { node: OrganizationId },
}

impl fmt::Display for HierarchyDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HierarchyDiagnostic::OrphanedNode { node, missing_parent } => write!(
                f,
                "organization {node} references missing parent {missing_parent}; treated as root"
            ),
            HierarchyDiagnostic::DuplicateNode { node } => {
                write!(f, "organization {node} declared more than once")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("cycle detected in organization hierarchy: {}", join_ids(.nodes))]
    CycleDetected { nodes: Vec<OrganizationId> },
    #[error("organization {node} declares conflicting parents: {}", join_ids(.parents))]
    ConflictingParents {
        node: OrganizationId,
        parents: Vec<OrganizationId>,
    },
}

pub(crate) fn join_ids(ids: &[OrganizationId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
