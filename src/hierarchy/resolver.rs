//! Building an [`OrganizationTree`] from a flat relation snapshot.
//!
//! The input is a set of parent/child relations as loaded from storage, so a
//! node may be listed more than once. Cycle detection walks every declared
//! parent edge with an explicit stack (visiting/visited marking) instead of
//! recursion, which keeps stack usage flat on deep or malformed hierarchies.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use super::node::{HierarchyDiagnostic, HierarchyError, OrganizationNode};
use super::tree::OrganizationTree;
use crate::model::OrganizationId;

/// A successfully built tree plus the findings the caller should log
#[derive(Debug, Clone)]
pub struct HierarchyBuild {
    pub tree: OrganizationTree,
    pub diagnostics: Vec<HierarchyDiagnostic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Visited,
}

/// Parent claims collected for one node id
#[derive(Debug, Default)]
struct Declaration {
    node: Option<OrganizationNode>,
    parents: BTreeSet<OrganizationId>,
    claims_root: bool,
}

/// Build an immutable tree from organization relations.
///
/// Fails with [`HierarchyError::CycleDetected`] if following parent edges
/// ever revisits a node, and with [`HierarchyError::ConflictingParents`] if a
/// node is declared under more than one parent. No partial tree is returned
/// on failure.
pub fn build_tree<I>(nodes: I) -> Result<HierarchyBuild, HierarchyError>
where
    I: IntoIterator<Item = OrganizationNode>,
{
    let mut declarations: BTreeMap<OrganizationId, Declaration> = BTreeMap::new();
    let mut diagnostics = Vec::new();

    for node in nodes {
        let declaration = declarations.entry(node.id).or_default();
        let is_new_claim = match node.parent_id {
            Some(parent) => declaration.parents.insert(parent),
            None => !std::mem::replace(&mut declaration.claims_root, true),
        };

        if declaration.node.is_none() {
            declaration.node = Some(node);
        } else if !is_new_claim {
            diagnostics.push(HierarchyDiagnostic::DuplicateNode { node: node.id });
        }
    }

    // Parent edges restricted to nodes present in the snapshot
    let edges: HashMap<OrganizationId, Vec<OrganizationId>> = declarations
        .iter()
        .map(|(id, declaration)| {
            let present: Vec<OrganizationId> = declaration
                .parents
                .iter()
                .filter(|parent| declarations.contains_key(parent))
                .copied()
                .collect();
            (*id, present)
        })
        .collect();

    detect_cycle(declarations.keys().copied(), &edges)?;

    for (id, declaration) in &declarations {
        let claims = declaration.parents.len() + usize::from(declaration.claims_root);
        if claims > 1 {
            return Err(HierarchyError::ConflictingParents {
                node: *id,
                parents: declaration.parents.iter().copied().collect(),
            });
        }
    }

    let mut tree = OrganizationTree::empty();
    for (id, declaration) in declarations {
        let Some(node) = declaration.node else {
            continue;
        };

        match declaration.parents.first().copied() {
            Some(parent) if edges.get(&id).is_some_and(|present| !present.is_empty()) => {
                tree.parents.insert(id, parent);
                tree.children.entry(parent).or_default().push(id);
            }
            Some(missing_parent) => {
                diagnostics.push(HierarchyDiagnostic::OrphanedNode {
                    node: id,
                    missing_parent,
                });
                tree.roots.push(id);
            }
            None => tree.roots.push(id),
        }

        tree.nodes.insert(id, node);
    }

    assign_depths(&mut tree);

    debug!(
        nodes = tree.len(),
        roots = tree.roots.len(),
        diagnostics = diagnostics.len(),
        "Organization hierarchy built"
    );

    Ok(HierarchyBuild { tree, diagnostics })
}

/// Iterative depth-first search over parent edges.
///
/// Returns the members of the first cycle found, sorted by id.
fn detect_cycle<I>(
    ids: I,
    edges: &HashMap<OrganizationId, Vec<OrganizationId>>,
) -> Result<(), HierarchyError>
where
    I: IntoIterator<Item = OrganizationId>,
{
    let mut marks: HashMap<OrganizationId, Mark> = HashMap::with_capacity(edges.len());

    for start in ids {
        if marks.contains_key(&start) {
            continue;
        }

        let mut stack: Vec<(OrganizationId, usize)> = vec![(start, 0)];
        marks.insert(start, Mark::Visiting);

        while let Some(&(node, edge)) = stack.last() {
            let next = edges.get(&node).and_then(|parents| parents.get(edge)).copied();

            let Some(parent) = next else {
                marks.insert(node, Mark::Visited);
                stack.pop();
                continue;
            };

            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            match marks.get(&parent) {
                Some(Mark::Visiting) => {
                    let position = stack
                        .iter()
                        .position(|(id, _)| *id == parent)
                        .unwrap_or(0);
                    let mut nodes: Vec<OrganizationId> =
                        stack[position..].iter().map(|(id, _)| *id).collect();
                    nodes.sort();
                    return Err(HierarchyError::CycleDetected { nodes });
                }
                Some(Mark::Visited) => {}
                None => {
                    marks.insert(parent, Mark::Visiting);
                    stack.push((parent, 0));
                }
            }
        }
    }

    Ok(())
}

fn assign_depths(tree: &mut OrganizationTree) {
    let mut queue: std::collections::VecDeque<(OrganizationId, usize)> =
        tree.roots.iter().map(|root| (*root, 0)).collect();

    while let Some((id, depth)) = queue.pop_front() {
        tree.depths.insert(id, depth);
        if let Some(children) = tree.children.get(&id) {
            queue.extend(children.iter().map(|child| (*child, depth + 1)));
        }
    }
}
