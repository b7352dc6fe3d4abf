use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "servicedir-publishing")]
#[command(about = "Publishing and versioning workflow for service directory entities")]
#[command(long_about = "Inspects organization hierarchies, validates entity versions for completeness \
                       and moves versions through their publishing lifecycle on a JSON directory snapshot.")]
pub struct Cli {
    /// Configuration file (defaults to servicedir-publishing.toml when present)
    #[arg(long, global = true, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the organization hierarchy and report roots, orphans and cycles
    Hierarchy {
        /// Directory snapshot file
        snapshot: PathBuf,
    },
    /// Check a version for completeness against its entity type's rules
    Validate {
        /// Directory snapshot file
        snapshot: PathBuf,
        /// Version to validate
        #[arg(long, help = "Id of the version to validate")]
        version: String,
    },
    /// Move a version to another publishing status
    Transition {
        /// Directory snapshot file
        snapshot: PathBuf,
        /// Version to transition
        #[arg(long, help = "Id of the version to transition")]
        version: String,
        /// Target status
        #[arg(long, help = "Target status: draft, published, removed, deleted")]
        to: String,
        /// Acting user
        #[arg(long, help = "Actor id as listed in the snapshot's actors")]
        actor: String,
        /// Show the outcome without writing the snapshot
        #[arg(long, help = "Compute the transition without saving the result")]
        dry_run: bool,
    },
    /// List entities with their overall publishing status
    Status {
        /// Directory snapshot file
        snapshot: PathBuf,
    },
}
