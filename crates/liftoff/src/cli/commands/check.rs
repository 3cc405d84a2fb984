//! Check command

use clap::Args;
use serde::Serialize;
use tracing::info;

use liftoff_core::workflow::{CheckReport, PublishWorkflow};
use liftoff_core::{next_version, BumpType};

use crate::cli::{output, Cli};

/// Check whether a package's current output was already published
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Package to check (required in monorepos with several packages)
    pub package: Option<String>,

    /// Bump used to predict the next version
    #[arg(short, long, default_value = "patch")]
    pub bump: BumpType,

    /// Exit with an error when the output is unchanged
    #[arg(long)]
    pub fail_on_duplicate: bool,
}

#[derive(Serialize)]
struct CheckOutput<'a> {
    #[serde(flatten)]
    report: &'a CheckReport,
    next_version: Option<String>,
}

impl CheckCommand {
    /// Execute the check command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(package = ?self.package, "executing check command");
        let workspace = cli.workspace()?;
        let workflow = PublishWorkflow::new(&workspace.config, &workspace.root);
        let report = workflow.check(self.package.as_deref())?;

        let next = if report.duplicate.is_duplicate {
            None
        } else {
            let current = report.last_version.as_deref().unwrap_or("0.0.0");
            Some(next_version(current, self.bump, None)?)
        };

        if cli.is_json() {
            output::json(&CheckOutput {
                report: &report,
                next_version: next.clone(),
            })?;
        } else if !cli.quiet {
            let hash = output::hash_style()
                .apply_to(output::short_hash(&report.hash))
                .to_string();
            match (&report.duplicate.existing_version, &next) {
                (Some(existing), _) => output::info(&format!(
                    "{} output ({}) matches published version {}",
                    report.package,
                    hash,
                    output::version_style().apply_to(existing)
                )),
                (None, Some(next)) => output::success(&format!(
                    "{} output ({}) changed, next version would be {}",
                    report.package,
                    hash,
                    output::version_style().apply_to(next)
                )),
                (None, None) => {}
            }
        }

        if self.fail_on_duplicate && report.duplicate.is_duplicate {
            anyhow::bail!("{} output is unchanged", report.package);
        }
        Ok(())
    }
}
