//! Store command

use clap::{Args, Subcommand};
use tracing::info;

use liftoff_core::oracle::HashStore;
use liftoff_core::workflow::PublishWorkflow;

use crate::cli::{output, Cli};

/// Inspect the hash store
#[derive(Debug, Args)]
pub struct StoreCommand {
    #[command(subcommand)]
    pub command: StoreSubcommand,
}

/// Store subcommands
#[derive(Debug, Subcommand)]
pub enum StoreSubcommand {
    /// Show recorded versions and hashes
    Show {
        /// Only show this package
        package: Option<String>,
    },

    /// Print the store file location
    Path,
}

impl StoreCommand {
    /// Execute the store command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let workspace = cli.workspace()?;
        let store_path = PublishWorkflow::new(&workspace.config, &workspace.root).store_path();

        match &self.command {
            StoreSubcommand::Path => {
                println!("{}", store_path.display());
                Ok(())
            }
            StoreSubcommand::Show { package } => {
                info!(package = ?package, path = %store_path.display(), "executing store show");
                let mut store = HashStore::load(&store_path)?;
                if let Some(name) = package {
                    store.packages.retain(|k, _| k == name);
                    if store.packages.is_empty() {
                        anyhow::bail!("No versions recorded for {}", name);
                    }
                }

                if cli.is_json() {
                    return output::json(&store);
                }
                if store.packages.is_empty() {
                    output::info(&format!(
                        "No publishes recorded in {}",
                        output::path_style().apply_to(store_path.display())
                    ));
                    return Ok(());
                }

                for (name, record) in &store.packages {
                    let last = record.last_version.as_deref().unwrap_or("-");
                    println!(
                        "{} {}",
                        output::header(name),
                        console::style(format!("(last: {})", last)).dim()
                    );
                    for (version, hash) in &record.versions {
                        println!(
                            "  {:<16} {}",
                            output::version_style().apply_to(version),
                            output::hash_style().apply_to(hash)
                        );
                    }
                }
                Ok(())
            }
        }
    }
}
