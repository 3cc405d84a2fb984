//! Release steps backed by shell commands and the local git repository

use std::path::PathBuf;

use tracing::{debug, warn};

use liftoff_core::config::Config;
use liftoff_core::error::{GitError, Result, WorkflowError};
use liftoff_core::exec::{command_env, render_template, run_shell, TemplateVars};
use liftoff_core::version::BumpType;
use liftoff_core::workflow::{ReleaseSteps, ResolvedPackage};
use liftoff_git::GitRepo;

use super::output;

/// Runs configured commands in package directories and git operations at the root
pub struct LocalSteps<'a> {
    config: &'a Config,
    root: PathBuf,
    repo: Option<GitRepo>,
    echo: bool,
    dry_run: bool,
}

impl<'a> LocalSteps<'a> {
    /// Create steps for a workspace rooted at `root`
    pub fn new(config: &'a Config, root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            root: root.into(),
            repo: None,
            echo: false,
            dry_run: false,
        }
    }

    /// Print each command before running it
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Value exported to commands as `LIFTOFF_DRY_RUN`
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn repo(&mut self) -> Result<&GitRepo> {
        if self.repo.is_none() {
            self.repo = Some(GitRepo::discover(&self.root)?);
        }
        self.repo
            .as_ref()
            .ok_or_else(|| GitError::NotARepository(self.root.clone()).into())
    }

    fn run(
        &self,
        step: &str,
        template: &str,
        package: &ResolvedPackage,
        vars: TemplateVars<'_>,
    ) -> Result<liftoff_core::exec::CommandOutput> {
        let command = render_template(template, &vars);
        if self.echo {
            output::info(&format!("{} $ {}", package.name, command));
        }
        let env = command_env(&vars, self.dry_run);
        run_shell(&command, &package.path, &env)?.check(step)
    }
}

impl ReleaseSteps for LocalSteps<'_> {
    fn ensure_clean(&mut self) -> Result<()> {
        self.repo()?.ensure_clean()?;
        Ok(())
    }

    fn build(&mut self, package: &ResolvedPackage) -> Result<()> {
        let vars = TemplateVars {
            name: &package.name,
            ..Default::default()
        };
        self.run("build", &self.config.commands.build, package, vars)?;
        Ok(())
    }

    fn run_script(&mut self, script: &str, package: &ResolvedPackage) -> Result<()> {
        let vars = TemplateVars {
            name: &package.name,
            ..Default::default()
        };
        self.run("script", script, package, vars)?;
        Ok(())
    }

    fn bump_version(
        &mut self,
        package: &ResolvedPackage,
        bump: BumpType,
        preid: Option<&str>,
    ) -> Result<String> {
        let mut template = self.config.commands.version.clone();
        if let (Some(preid), true) = (preid, bump.is_prerelease()) {
            if template.starts_with("npm version") && !template.contains("--preid") {
                template.push_str(&format!(" --preid {}", preid));
            }
        }
        let vars = TemplateVars {
            name: &package.name,
            version: None,
            bump: Some(bump.as_str()),
        };
        let output = self.run("version", &template, package, vars)?;
        output.last_line().map(str::to_string).ok_or_else(|| {
            WorkflowError::StepFailed {
                step: "version".to_string(),
                reason: format!("`{}` printed no version", output.command),
            }
            .into()
        })
    }

    fn commit(&mut self, message: &str) -> Result<()> {
        match self.repo()?.commit_all(message) {
            Ok(id) => {
                debug!(commit = %id, "committed release");
                Ok(())
            }
            Err(GitError::NothingToCommit) => {
                warn!("release produced no changes to commit");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn tag(&mut self, name: &str, message: &str) -> Result<()> {
        self.repo()?.create_tag(name, message)?;
        Ok(())
    }

    fn publish(&mut self, package: &ResolvedPackage, version: &str) -> Result<()> {
        let vars = TemplateVars {
            name: &package.name,
            version: Some(version),
            bump: None,
        };
        self.run("publish", &self.config.commands.publish, package, vars)?;
        Ok(())
    }

    fn push(&mut self, tag: &str) -> Result<()> {
        let remote = self.config.git.remote.clone();
        self.repo()?.push_release(&remote, tag)?;
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use git2::{Repository, Signature};
    use liftoff_core::LiftoffError;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn package(temp: &TempDir) -> ResolvedPackage {
        ResolvedPackage {
            name: "core".to_string(),
            path: temp.path().to_path_buf(),
            output_dir: temp.path().join("dist"),
            scripts: Vec::new(),
        }
    }

    #[test]
    fn test_build_runs_in_package_dir() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.commands.build = "mkdir -p dist && echo $LIFTOFF_PACKAGE > dist/name".to_string();
        let mut steps = LocalSteps::new(&config, temp.path());

        steps.build(&package(&temp)).unwrap();
        assert_eq!(fs::read_to_string(temp.path().join("dist/name")).unwrap(), "core\n");
    }

    #[test]
    fn test_bump_reads_last_line() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.commands.version = "echo bumping {bump}; echo v1.3.0".to_string();
        let mut steps = LocalSteps::new(&config, temp.path());

        let version = steps
            .bump_version(&package(&temp), BumpType::Minor, None)
            .unwrap();
        assert_eq!(version, "v1.3.0");
    }

    #[test]
    fn test_bump_without_output_fails() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.commands.version = "true".to_string();
        let mut steps = LocalSteps::new(&config, temp.path());

        assert!(steps
            .bump_version(&package(&temp), BumpType::Patch, None)
            .is_err());
    }

    #[test]
    fn test_failing_script() {
        let temp = TempDir::new().unwrap();
        let config = Config::default();
        let mut steps = LocalSteps::new(&config, temp.path());

        let err = steps.run_script("exit 1", &package(&temp)).unwrap_err();
        assert!(err.to_string().contains("script"));
    }

    #[test]
    fn test_build_sees_dry_run_flag() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.commands.build = "echo $LIFTOFF_DRY_RUN > flag".to_string();

        let mut steps = LocalSteps::new(&config, temp.path()).with_dry_run(true);
        steps.build(&package(&temp)).unwrap();
        assert_eq!(fs::read_to_string(temp.path().join("flag")).unwrap(), "true\n");

        let mut steps = LocalSteps::new(&config, temp.path());
        steps.build(&package(&temp)).unwrap();
        assert_eq!(fs::read_to_string(temp.path().join("flag")).unwrap(), "false\n");
    }

    fn init_repo(temp: &TempDir) {
        let repo = Repository::init(temp.path()).unwrap();
        let sig = Signature::now("Release Bot", "release@example.com").unwrap();
        fs::write(temp.path().join("package.json"), "{}").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("package.json")).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
            .unwrap();
    }

    #[test]
    fn test_ensure_clean_on_clean_repository() {
        let temp = TempDir::new().unwrap();
        init_repo(&temp);
        let config = Config::default();
        let mut steps = LocalSteps::new(&config, temp.path());

        assert!(steps.ensure_clean().is_ok());
    }

    #[test]
    fn test_ensure_clean_on_dirty_repository() {
        let temp = TempDir::new().unwrap();
        init_repo(&temp);
        fs::write(temp.path().join("scratch.txt"), "wip").unwrap();
        let config = Config::default();
        let mut steps = LocalSteps::new(&config, temp.path());

        assert!(matches!(
            steps.ensure_clean(),
            Err(LiftoffError::Git(GitError::DirtyWorkingDirectory))
        ));
    }
}
