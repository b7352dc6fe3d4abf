// In-process adapters for the publishing collaborators, backed by a JSON
// directory snapshot. The CLI and the integration tests run on these.

pub mod grants;
pub mod snapshot;
pub mod store;

pub use grants::GrantPolicy;
pub use snapshot::{DirectorySnapshot, SnapshotError};
pub use store::InMemoryStore;
