//! Publish command

use clap::Args;
use console::style;
use dialoguer::Confirm;
use tracing::info;

use liftoff_core::workflow::{PublishOutcome, PublishReport, PublishRequest, PublishWorkflow};
use liftoff_core::BumpType;

use crate::cli::{output, Cli, LocalSteps};
use crate::exit_codes::Cancelled;

/// Build, hash and publish a package if its output changed
#[derive(Debug, Args)]
pub struct PublishCommand {
    /// Package to publish (required in monorepos with several packages)
    pub package: Option<String>,

    /// Version bump (major, minor, patch, premajor, preminor, prepatch, prerelease)
    #[arg(short, long, default_value = "patch")]
    pub bump: BumpType,

    /// Prerelease identifier for pre* bumps (e.g. alpha, beta, rc)
    #[arg(long)]
    pub preid: Option<String>,

    /// Build and hash but don't bump, commit, tag or publish
    #[arg(long)]
    pub dry_run: bool,

    /// Publish even if the output matches an already published version
    #[arg(long)]
    pub force: bool,

    /// Skip the clean working directory check
    #[arg(long)]
    pub allow_dirty: bool,

    /// Hash the existing output without building
    #[arg(long)]
    pub no_build: bool,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl PublishCommand {
    /// Execute the publish command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            package = ?self.package,
            bump = %self.bump,
            dry_run = self.dry_run,
            force = self.force,
            "executing publish command"
        );
        let workspace = cli.workspace()?;
        let workflow = PublishWorkflow::new(&workspace.config, &workspace.root);
        let plan = workflow.plan(self.package.as_deref())?;

        let text = !cli.quiet && !cli.is_json();
        if text {
            println!("{}", output::header("Publish Preview"));
            println!();
            println!("{}", output::key_value("Package", &plan.target.name));
            if !plan.dependencies.is_empty() {
                let deps: Vec<_> = plan.dependencies.iter().map(|d| d.name.as_str()).collect();
                println!("{}", output::key_value("Builds first", &deps.join(", ")));
            }
            println!(
                "{}",
                output::key_value(
                    "Output",
                    &output::path_style()
                        .apply_to(plan.target.output_dir.display())
                        .to_string()
                )
            );
            println!("{}", output::key_value("Bump", self.bump.as_str()));
            println!();
            if self.dry_run {
                println!("  {}", style("[DRY RUN - no changes will be made]").yellow().bold());
                println!();
            }
        }

        if !self.yes && !self.dry_run {
            let confirmed = Confirm::new()
                .with_prompt(format!("Publish {}?", plan.target.name))
                .default(true)
                .interact()?;
            if !confirmed {
                return Err(Cancelled.into());
            }
        }

        let request = PublishRequest {
            package: Some(plan.target.name.clone()),
            bump: self.bump,
            preid: self.preid.clone(),
            dry_run: self.dry_run,
            force: self.force,
            allow_dirty: self.allow_dirty,
            skip_build: self.no_build,
        };
        let mut steps = LocalSteps::new(&workspace.config, &workspace.root)
            .with_echo(cli.verbose)
            .with_dry_run(self.dry_run);
        let report = workflow.run(&request, &mut steps)?;

        if cli.is_json() {
            output::json(&report)?;
        } else if !cli.quiet {
            print_report(&report);
        }
        Ok(())
    }
}

fn print_report(report: &PublishReport) {
    let hash = output::hash_style()
        .apply_to(output::short_hash(&report.hash))
        .to_string();
    match &report.outcome {
        PublishOutcome::Published => {
            let version = report.version.as_deref().unwrap_or_default();
            output::success(&format!(
                "Published {} {}",
                report.package,
                output::version_style().apply_to(version)
            ));
            if let Some(tag) = &report.tag {
                let tag = output::tag_style().apply_to(tag).to_string();
                println!("{}", output::key_value("Tag", &tag));
            }
            println!("{}", output::key_value("Hash", &hash));
        }
        PublishOutcome::Duplicate { existing_version } => {
            output::info(&format!(
                "{} is unchanged since {} ({}), nothing to publish",
                report.package,
                output::version_style().apply_to(existing_version),
                hash
            ));
        }
        PublishOutcome::DryRun => {
            let version = report.version.as_deref().unwrap_or("unknown");
            output::info(&format!(
                "Would publish {} {} ({})",
                report.package,
                output::version_style().apply_to(version),
                hash
            ));
        }
    }
}
