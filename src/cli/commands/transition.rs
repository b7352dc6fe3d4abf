use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

use super::{load_snapshot, Command};
use crate::config::PublishingConfig;
use crate::memory::{GrantPolicy, InMemoryStore};
use crate::model::{PublishingStatus, VersionId};
use crate::publishing::{PublishingError, PublishingManager, TransitionRequest};
use crate::versioning::TransitionResult;

pub struct TransitionCommand {
    pub snapshot: PathBuf,
    pub version: String,
    pub target: String,
    pub actor: String,
    pub dry_run: bool,
    pub config: PublishingConfig,
}

impl TransitionCommand {
    pub fn new(
        snapshot: PathBuf,
        version: String,
        target: String,
        actor: String,
        config: PublishingConfig,
    ) -> Self {
        Self {
            snapshot,
            version,
            target,
            actor,
            dry_run: false,
            config,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl Command for TransitionCommand {
    async fn execute(&self) -> Result<()> {
        let version_id: VersionId = self
            .version
            .parse()
            .with_context(|| format!("'{}' is not a version id", self.version))?;
        let target: PublishingStatus = self.target.parse().map_err(|e: String| anyhow!(e))?;

        let snapshot = load_snapshot(&self.snapshot).await?;
        let actor = snapshot
            .actor(&self.actor)
            .cloned()
            .ok_or_else(|| anyhow!("unknown actor '{}'", self.actor))?;

        let policy = GrantPolicy::from_nodes(snapshot.organizations.clone()).map_err(|err| {
            error!(error = %err, "Organization hierarchy could not be resolved");
            report(err.into())
        })?;
        let store = Arc::new(InMemoryStore::from_snapshot(snapshot.clone())?);
        let manager = PublishingManager::from_config(store.clone(), Arc::new(policy), &self.config);

        let request = TransitionRequest::new(version_id, target, actor);

        if self.dry_run {
            println!("🔍 DRY RUN - snapshot will not be modified");
            let plan = manager.plan_transition(&request).await.map_err(report)?;
            print_result(&plan);
            return Ok(());
        }

        let result = manager.request_transition(request).await.map_err(report)?;
        print_result(&result);

        let mut updated = store.to_snapshot().await;
        updated.actors = snapshot.actors;
        updated
            .save(&self.snapshot)
            .await
            .with_context(|| format!("Failed to write snapshot {}", self.snapshot.display()))?;
        println!("💾 Snapshot saved to {}", self.snapshot.display());

        if self.config.observability.metrics_enabled {
            manager.metrics().log_stats();
        }
        Ok(())
    }
}

fn print_result(result: &TransitionResult) {
    println!("✅ Version {}: {} → {}", result.version_id, result.from, result.to);
    for change in &result.changes {
        match change.from {
            Some(from) => println!("   → {} {} → {}", change.version_id, from, change.to),
            None => println!("   ➕ {} created as {}", change.version_id, change.to),
        }
    }
    println!(
        "📊 Entity {} is now {} (was {})",
        result.unific_root_id, result.entity_status_after, result.entity_status_before
    );
}

fn report(err: PublishingError) -> anyhow::Error {
    match &err {
        PublishingError::ValidationFailed(verdict) => {
            println!("❌ Validation failed:");
            for violation in &verdict.violations {
                println!("   → {} [{}] {}", violation.field_path, violation.rule_id, violation.reason);
            }
        }
        other => println!("❌ {other}"),
    }
    err.into()
}
