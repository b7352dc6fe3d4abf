use anyhow::{anyhow, Result};
use std::path::PathBuf;

use super::{load_snapshot, Command};
use crate::hierarchy::{build_tree, HierarchyError, OrganizationTree};
use crate::model::{NodeStatus, OrganizationId};

pub struct HierarchyCommand {
    pub snapshot: PathBuf,
}

impl HierarchyCommand {
    pub fn new(snapshot: PathBuf) -> Self {
        Self { snapshot }
    }
}

impl Command for HierarchyCommand {
    async fn execute(&self) -> Result<()> {
        let snapshot = load_snapshot(&self.snapshot).await?;

        println!("🌳 ORGANIZATION HIERARCHY");
        println!("=========================");
        println!();

        match build_tree(snapshot.organizations) {
            Ok(build) => {
                println!(
                    "📊 {} organization(s), {} root(s)",
                    build.tree.len(),
                    build.tree.roots().len()
                );
                println!();

                for root in build.tree.roots() {
                    print_node(&build.tree, *root);
                    for id in build.tree.descendants_of(*root) {
                        print_node(&build.tree, id);
                    }
                }

                if !build.diagnostics.is_empty() {
                    println!();
                    println!("⚠️  DIAGNOSTICS:");
                    for diagnostic in &build.diagnostics {
                        println!("   → {diagnostic}");
                    }
                }
                Ok(())
            }
            Err(HierarchyError::CycleDetected { nodes }) => {
                println!("❌ Cycle detected between:");
                for node in &nodes {
                    println!("   🔁 {node}");
                }
                Err(anyhow!("organization hierarchy contains a cycle"))
            }
            Err(err) => {
                println!("❌ {err}");
                Err(err.into())
            }
        }
    }
}

fn print_node(tree: &OrganizationTree, id: OrganizationId) {
    let depth = tree.depth_of(id).unwrap_or(0);
    let Some(node) = tree.get(id) else {
        return;
    };
    let marker = match node.status {
        NodeStatus::Active => "🏢",
        NodeStatus::Archived => "📦",
        NodeStatus::Removed => "🗑️",
    };
    let label = node.name.as_deref().unwrap_or("(unnamed)");
    println!("{}{marker} {label} [{id}]", "   ".repeat(depth));
}
