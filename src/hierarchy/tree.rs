//! Immutable organization tree.
//!
//! Nodes live in a flat map keyed by id; parent and child relations are id
//! references resolved through that map. A tree is only ever produced by
//! [`build_tree`](super::build_tree), which guarantees it is acyclic and that
//! every node has at most one resolved parent.

use std::collections::HashMap;

use super::node::OrganizationNode;
use crate::model::{NodeStatus, OrganizationId};

#[derive(Debug, Clone, Default)]
pub struct OrganizationTree {
    pub(super) nodes: HashMap<OrganizationId, OrganizationNode>,
    /// Resolved parent; orphans have no entry here
    pub(super) parents: HashMap<OrganizationId, OrganizationId>,
    pub(super) children: HashMap<OrganizationId, Vec<OrganizationId>>,
    pub(super) roots: Vec<OrganizationId>,
    pub(super) depths: HashMap<OrganizationId, usize>,
}

impl OrganizationTree {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: OrganizationId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: OrganizationId) -> Option<&OrganizationNode> {
        self.nodes.get(&id)
    }

    pub fn status_of(&self, id: OrganizationId) -> Option<NodeStatus> {
        self.nodes.get(&id).map(|node| node.status)
    }

    /// Roots in id order, including orphans promoted to roots
    pub fn roots(&self) -> &[OrganizationId] {
        &self.roots
    }

    pub fn parent_of(&self, id: OrganizationId) -> Option<&OrganizationNode> {
        self.parents.get(&id).and_then(|parent| self.nodes.get(parent))
    }

    /// Direct children in id order
    pub fn children_of(&self, id: OrganizationId) -> &[OrganizationId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distance from the node's root; roots have depth 0
    pub fn depth_of(&self, id: OrganizationId) -> Option<usize> {
        self.depths.get(&id).copied()
    }

    pub fn root_of(&self, id: OrganizationId) -> Option<OrganizationId> {
        if !self.contains(id) {
            return None;
        }
        let mut current = id;
        while let Some(&parent) = self.parents.get(&current) {
            current = parent;
        }
        Some(current)
    }

    /// Strict ancestors of `id`, ordered root first.
    ///
    /// Empty for roots and for ids that are not in the tree.
    pub fn ancestors_of(&self, id: OrganizationId) -> Vec<&OrganizationNode> {
        let mut chain = Vec::with_capacity(self.depth_of(id).unwrap_or(0));
        let mut current = id;
        while let Some(parent) = self.parents.get(&current) {
            if let Some(node) = self.nodes.get(parent) {
                chain.push(node);
            }
            current = *parent;
        }
        chain.reverse();
        chain
    }

    /// True when `ancestor` appears strictly above `id`
    pub fn is_descendant_of(&self, id: OrganizationId, ancestor: OrganizationId) -> bool {
        let mut current = id;
        while let Some(&parent) = self.parents.get(&current) {
            if parent == ancestor {
                return true;
            }
            current = parent;
        }
        false
    }

    /// Every node below `id`, in depth-first pre-order
    pub fn descendants_of(&self, id: OrganizationId) -> Vec<OrganizationId> {
        let mut result = Vec::new();
        let mut stack: Vec<OrganizationId> = self.children_of(id).iter().rev().copied().collect();

        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children_of(current).iter().rev().copied());
        }

        result
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrganizationNode> {
        self.nodes.values()
    }
}
