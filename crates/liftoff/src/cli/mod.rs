//! CLI definition and command handling

pub mod commands;
pub mod output;
mod steps;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;

use liftoff_core::config::{config_root, load_config, load_config_or_default, Config};

use commands::{
    CheckCommand, CompletionsCommand, GraphCommand, HashCommand, InitCommand, PublishCommand,
    StoreCommand,
};

pub use steps::LocalSteps;

/// Liftoff - publish packages only when their build output changed
#[derive(Debug, Parser)]
#[command(name = "liftoff")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Configuration file (default: search from the working directory upwards)
    #[arg(short, long, global = true, env = "LIFTOFF_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a starter configuration
    Init(InitCommand),

    /// Build, hash and publish a package if its output changed
    Publish(PublishCommand),

    /// Print the content hash of a directory
    Hash(HashCommand),

    /// Check whether a package's current output was already published
    Check(CheckCommand),

    /// Show the package dependency order
    Graph(GraphCommand),

    /// Inspect the hash store
    Store(StoreCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// Loaded configuration and the directory its paths resolve against
pub struct Workspace {
    pub config: Config,
    pub root: PathBuf,
    pub config_path: Option<PathBuf>,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)
                .with_context(|| format!("cannot change to {}", dir.display()))?;
        }

        match self.command {
            Commands::Init(ref cmd) => cmd.execute(&self),
            Commands::Publish(ref cmd) => cmd.execute(&self),
            Commands::Hash(ref cmd) => cmd.execute(&self),
            Commands::Check(ref cmd) => cmd.execute(&self),
            Commands::Graph(ref cmd) => cmd.execute(&self),
            Commands::Store(ref cmd) => cmd.execute(&self),
            Commands::Completions(ref cmd) => cmd.execute(&self),
        }
    }

    /// Whether output should be machine readable
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Load the configuration named by `--config`, or discover one
    pub fn workspace(&self) -> anyhow::Result<Workspace> {
        let cwd = std::env::current_dir()?;
        self.workspace_in(&cwd)
    }

    fn workspace_in(&self, cwd: &Path) -> anyhow::Result<Workspace> {
        let workspace = match &self.config {
            Some(path) => {
                let path = cwd.join(path);
                let config = load_config(&path)?;
                Workspace {
                    config,
                    root: config_root(&path),
                    config_path: Some(path),
                }
            }
            None => {
                let (config, config_path) = load_config_or_default(cwd)?;
                let root = config_path
                    .as_deref()
                    .map(config_root)
                    .unwrap_or_else(|| cwd.to_path_buf());
                Workspace {
                    config,
                    root,
                    config_path,
                }
            }
        };

        debug!(
            root = %workspace.root.display(),
            config = ?workspace.config_path,
            "resolved workspace"
        );

        if workspace.config_path.is_none() && !self.quiet && !self.is_json() {
            output::warning("No configuration found, using defaults.");
        }
        Ok(workspace)
    }
}
