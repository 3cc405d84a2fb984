//! Hash command

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tracing::info;

use liftoff_core::oracle::hash_directory;

use crate::cli::{output, Cli};

/// Print the content hash of a directory
#[derive(Debug, Args)]
pub struct HashCommand {
    /// Directory to hash
    pub dir: PathBuf,
}

#[derive(Serialize)]
struct HashOutput<'a> {
    path: &'a str,
    hash: &'a str,
}

impl HashCommand {
    /// Execute the hash command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(dir = %self.dir.display(), "executing hash command");
        let hash = hash_directory(&self.dir)?;

        if cli.is_json() {
            let path = self.dir.display().to_string();
            output::json(&HashOutput {
                path: &path,
                hash: hash.as_str(),
            })?;
        } else {
            println!("{}", hash);
        }
        Ok(())
    }
}
