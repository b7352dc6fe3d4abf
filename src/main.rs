use anyhow::Result;
use clap::Parser;

use servicedir_publishing::cli::commands::hierarchy::HierarchyCommand;
use servicedir_publishing::cli::commands::status::StatusCommand;
use servicedir_publishing::cli::commands::transition::TransitionCommand;
use servicedir_publishing::cli::commands::validate::ValidateCommand;
use servicedir_publishing::cli::commands::Command;
use servicedir_publishing::cli::{Cli, Commands};
use servicedir_publishing::config::init_config;
use servicedir_publishing::telemetry::init_telemetry;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = init_config(cli.config.as_deref())?.clone();
    init_telemetry(&config.observability)?;
    tracing::debug!(?config, "Configuration loaded");

    tokio::runtime::Runtime::new()?.block_on(async {
        match cli.command {
            Commands::Hierarchy { snapshot } => HierarchyCommand::new(snapshot).execute().await,
            Commands::Validate { snapshot, version } => {
                ValidateCommand::new(snapshot, version, config).execute().await
            }
            Commands::Transition {
                snapshot,
                version,
                to,
                actor,
                dry_run,
            } => {
                TransitionCommand::new(snapshot, version, to, actor, config)
                    .with_dry_run(dry_run)
                    .execute()
                    .await
            }
            Commands::Status { snapshot } => StatusCommand::new(snapshot, config).execute().await,
        }
    })
}
