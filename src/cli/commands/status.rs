use anyhow::Result;
use std::path::PathBuf;

use super::{load_snapshot, Command};
use crate::config::PublishingConfig;
use crate::model::PublishingStatus;

pub struct StatusCommand {
    pub snapshot: PathBuf,
    pub config: PublishingConfig,
}

impl StatusCommand {
    pub fn new(snapshot: PathBuf, config: PublishingConfig) -> Self {
        Self { snapshot, config }
    }
}

impl Command for StatusCommand {
    async fn execute(&self) -> Result<()> {
        let snapshot = load_snapshot(&self.snapshot).await?;
        let languages = &self.config.validation.required_languages;

        println!("📋 DIRECTORY STATUS");
        println!("===================");
        println!();

        if snapshot.entities.is_empty() {
            println!("📭 No entities in snapshot");
            return Ok(());
        }

        for entity in &snapshot.entities {
            let status = entity.status();
            let icon = match status {
                PublishingStatus::Published => "🟢",
                PublishingStatus::Modified => "🟡",
                PublishingStatus::Draft => "📝",
                PublishingStatus::OldPublished => "🕰️",
                PublishingStatus::Removed => "🗑️",
                PublishingStatus::Deleted => "⛔",
            };
            let name = entity
                .current_version()
                .and_then(|v| v.payload.name().preferred(languages))
                .unwrap_or("(unnamed)");

            println!(
                "{icon} {} {name} [{}] - {status}",
                entity.entity_type, entity.unific_root_id
            );
            for version in &entity.versions {
                println!(
                    "   v{} {} - {}",
                    version.version_number, version.id, version.status
                );
            }
        }

        if !snapshot.history.is_empty() {
            println!();
            println!("🧾 {} recorded transition(s)", snapshot.history.len());
        }
        Ok(())
    }
}
