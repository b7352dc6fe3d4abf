use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use super::{load_snapshot, Command};
use crate::config::PublishingConfig;
use crate::memory::{GrantPolicy, InMemoryStore};
use crate::model::VersionId;
use crate::publishing::PublishingManager;

pub struct ValidateCommand {
    pub snapshot: PathBuf,
    pub version: String,
    pub config: PublishingConfig,
}

impl ValidateCommand {
    pub fn new(snapshot: PathBuf, version: String, config: PublishingConfig) -> Self {
        Self {
            snapshot,
            version,
            config,
        }
    }
}

impl Command for ValidateCommand {
    async fn execute(&self) -> Result<()> {
        let version_id: VersionId = self
            .version
            .parse()
            .with_context(|| format!("'{}' is not a version id", self.version))?;

        let snapshot = load_snapshot(&self.snapshot).await?;
        let store = Arc::new(InMemoryStore::from_snapshot(snapshot)?);
        let manager =
            PublishingManager::from_config(store, Arc::new(GrantPolicy::default()), &self.config);

        println!("🔍 VALIDATING VERSION {version_id}");
        println!("==================================================");

        let verdict = manager.validate_version(version_id).await?;
        if verdict.passed() {
            println!("✅ {verdict}");
            return Ok(());
        }

        println!("❌ {} version has {} violation(s):", verdict.entity_type, verdict.violations.len());
        for violation in &verdict.violations {
            println!(
                "   → {} [{}] {}",
                violation.field_path, violation.rule_id, violation.reason
            );
        }
        bail!("version {version_id} is incomplete")
    }
}
