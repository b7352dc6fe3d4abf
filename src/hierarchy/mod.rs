// Organization hierarchy resolution
//
// Turns a flat snapshot of organization relations into an immutable tree and
// answers ancestor/descendant queries against it. Each build is an independent
// snapshot with no shared state, so builds may run in parallel.

pub mod node;
pub mod resolver;
pub mod tree;

pub use node::{HierarchyDiagnostic, HierarchyError, OrganizationNode};
pub use resolver::{build_tree, HierarchyBuild};
pub use tree::OrganizationTree;
