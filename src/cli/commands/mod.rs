use anyhow::{Context, Result};
use std::path::Path;

use crate::memory::DirectorySnapshot;

pub mod hierarchy;
pub mod status;
pub mod transition;
pub mod validate;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

pub async fn load_snapshot(path: &Path) -> Result<DirectorySnapshot> {
    DirectorySnapshot::load(path)
        .await
        .with_context(|| format!("Failed to read snapshot {}", path.display()))
}
