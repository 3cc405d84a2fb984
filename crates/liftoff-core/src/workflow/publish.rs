//! Publish workflow orchestration

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{GraphError, Result, WorkflowError};
use crate::exec::{render_template, TemplateVars};
use crate::graph::DependencyGraph;
use crate::oracle::{hash_directory, is_duplicate, record_publish, DuplicateCheck, HashStore};
use crate::version::{next_version, parse_version, BumpType};

use super::steps::{ReleaseSteps, ResolvedPackage};

/// Options for one publish run
#[derive(Debug, Clone, Default)]
pub struct PublishRequest {
    /// Package to publish; required when several packages are configured
    pub package: Option<String>,
    /// Version increment
    pub bump: BumpType,
    /// Prerelease identifier for pre* bumps
    pub preid: Option<String>,
    /// Build and hash, but change nothing
    pub dry_run: bool,
    /// Publish even when the output matches a recorded version
    pub force: bool,
    /// Skip the clean working tree check
    pub allow_dirty: bool,
    /// Hash the existing output without building
    pub skip_build: bool,
}

impl PublishRequest {
    /// Request for one package
    pub fn for_package(name: impl Into<String>) -> Self {
        Self {
            package: Some(name.into()),
            ..Default::default()
        }
    }

    /// Set the bump type
    pub fn with_bump(mut self, bump: BumpType) -> Self {
        self.bump = bump;
        self
    }

    /// Set dry run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// How a publish run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// A new version was published
    Published,
    /// The output matches an already published version
    Duplicate { existing_version: String },
    /// Dry run; nothing was changed
    DryRun,
}

/// Result of a publish run
#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    /// Target package
    pub package: String,
    /// Packages built, in order, ending with the target
    pub built: Vec<String>,
    /// Content hash of the target's output
    pub hash: String,
    /// Last recorded version before this run
    pub previous_version: Option<String>,
    /// Published (or predicted, for dry runs) version
    pub version: Option<String>,
    /// Tag created for the release
    pub tag: Option<String>,
    /// How the run ended
    pub outcome: PublishOutcome,
}

/// Result of a build-free duplicate check
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// Target package
    pub package: String,
    /// Output directory that was hashed
    pub output_dir: PathBuf,
    /// Content hash of the output
    pub hash: String,
    /// Last recorded version
    pub last_version: Option<String>,
    /// Duplicate lookup result
    pub duplicate: DuplicateCheck,
}

/// Build order for a target package
#[derive(Debug, Clone)]
pub struct PublishPlan {
    /// The package being published
    pub target: ResolvedPackage,
    /// Packages to build first, dependencies before dependents
    pub dependencies: Vec<ResolvedPackage>,
}

/// Drives [`ReleaseSteps`] through a publish
pub struct PublishWorkflow<'a> {
    config: &'a Config,
    root: PathBuf,
}

impl<'a> PublishWorkflow<'a> {
    /// Create a workflow for a config rooted at `root`
    pub fn new(config: &'a Config, root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            root: root.into(),
        }
    }

    /// Directory relative config paths resolve against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Hash store location
    pub fn store_path(&self) -> PathBuf {
        self.config.store_path(&self.root)
    }

    /// Resolve the target and its build order.
    ///
    /// In monorepo mode the whole graph is validated first, so a cycle
    /// anywhere aborts the run.
    pub fn plan(&self, package: Option<&str>) -> Result<PublishPlan> {
        if !self.config.is_monorepo() {
            let name = package
                .map(str::to_string)
                .or_else(|| self.config.name.clone())
                .or_else(|| {
                    self.root
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                })
                .unwrap_or_else(|| "package".to_string());
            let target = self.resolve(&name, &self.root);
            return Ok(PublishPlan {
                target,
                dependencies: Vec::new(),
            });
        }

        let graph = DependencyGraph::new(self.config.package_nodes(&self.root));
        graph.topological_sort()?;

        let name = match package {
            Some(name) => name.to_string(),
            None if graph.len() == 1 => graph.nodes()[0].name.clone(),
            None => {
                return Err(WorkflowError::PreConditionFailed(
                    "a package name is required when several packages are configured".to_string(),
                )
                .into())
            }
        };

        let node = graph
            .get(&name)
            .ok_or_else(|| GraphError::UnknownPackage(name.clone()))?;
        let target = self.resolve(&node.name, &node.path);
        let dependencies = graph
            .dependency_order(&name)
            .into_iter()
            .map(|dep| self.resolve(&dep.name, &dep.path))
            .collect();

        Ok(PublishPlan {
            target,
            dependencies,
        })
    }

    fn resolve(&self, name: &str, path: &Path) -> ResolvedPackage {
        let package = self.config.package(name);
        let output_dir = package
            .and_then(|p| p.output_dir.as_ref())
            .unwrap_or(&self.config.output_dir);
        let scripts = package
            .and_then(|p| p.scripts.clone())
            .unwrap_or_else(|| self.config.scripts.clone());

        ResolvedPackage {
            name: name.to_string(),
            path: path.to_path_buf(),
            output_dir: path.join(output_dir),
            scripts,
        }
    }

    /// Hash the current output of a package and compare with the store
    pub fn check(&self, package: Option<&str>) -> Result<CheckReport> {
        let plan = self.plan(package)?;
        let hash = hash_directory(&plan.target.output_dir)?;
        let store = HashStore::load(&self.store_path())?;
        let duplicate = is_duplicate(&store, &plan.target.name, &hash);

        Ok(CheckReport {
            last_version: store.last_version(&plan.target.name).map(str::to_string),
            package: plan.target.name,
            output_dir: plan.target.output_dir,
            hash: hash.to_string(),
            duplicate,
        })
    }

    /// Run the publish
    pub fn run<S: ReleaseSteps + ?Sized>(
        &self,
        request: &PublishRequest,
        steps: &mut S,
    ) -> Result<PublishReport> {
        let plan = self.plan(request.package.as_deref())?;
        let target = &plan.target;
        let git = &self.config.git;
        info!(
            package = %target.name,
            dependencies = plan.dependencies.len(),
            bump = %request.bump,
            dry_run = request.dry_run,
            "starting publish"
        );

        if git.enabled && git.require_clean && !request.allow_dirty && !request.dry_run {
            steps.ensure_clean()?;
        }

        let mut built = Vec::new();
        if request.skip_build {
            debug!("skipping builds");
        } else {
            for package in plan.dependencies.iter().chain(std::iter::once(target)) {
                info!(package = %package.name, "building");
                steps.build(package)?;
                built.push(package.name.clone());
            }
        }

        for script in &target.scripts {
            info!(package = %target.name, script = %script, "running validation script");
            steps.run_script(script, target)?;
        }

        let hash = hash_directory(&target.output_dir)?;
        let store_path = self.store_path();
        let store = HashStore::load(&store_path)?;
        let previous_version = store.last_version(&target.name).map(str::to_string);

        let mut report = PublishReport {
            package: target.name.clone(),
            built,
            hash: hash.to_string(),
            previous_version: previous_version.clone(),
            version: None,
            tag: None,
            outcome: PublishOutcome::DryRun,
        };

        let check = is_duplicate(&store, &target.name, &hash);
        if let Some(existing) = check.existing_version {
            if request.force {
                warn!(
                    package = %target.name,
                    existing = %existing,
                    "output already published, forcing publish"
                );
            } else {
                info!(
                    package = %target.name,
                    existing = %existing,
                    "output already published, skipping"
                );
                report.version = Some(existing.clone());
                report.outcome = PublishOutcome::Duplicate {
                    existing_version: existing,
                };
                return Ok(report);
            }
        }

        if request.dry_run {
            let current = previous_version.as_deref().unwrap_or("0.0.0");
            report.version = next_version(current, request.bump, request.preid.as_deref()).ok();
            report.tag = report.version.as_deref().map(|v| self.tag_name(&target.name, v));
            info!(package = %target.name, version = ?report.version, "dry run complete");
            return Ok(report);
        }

        let raw = steps.bump_version(target, request.bump, request.preid.as_deref())?;
        let version = parse_version(&raw)?.to_string();
        info!(package = %target.name, version = %version, "bumped version");

        steps.publish(target, &version)?;
        info!(package = %target.name, version = %version, "published");

        // Recorded only once the registry accepted the version, and before
        // the release commit so the store travels inside it.
        record_publish(store, &target.name, &version, &hash).persist(&store_path)?;

        if git.enabled {
            let vars = TemplateVars {
                name: &target.name,
                version: Some(&version),
                bump: Some(request.bump.as_str()),
            };
            steps.commit(&render_template(&git.commit_message, &vars))?;

            let tag = self.tag_name(&target.name, &version);
            steps.tag(&tag, &format!("Release {}@{}", target.name, version))?;
            if git.push {
                steps.push(&tag)?;
            }
            report.tag = Some(tag);
        }

        report.version = Some(version);
        report.outcome = PublishOutcome::Published;
        Ok(report)
    }

    fn tag_name(&self, name: &str, version: &str) -> String {
        let vars = TemplateVars {
            name,
            version: Some(version),
            bump: None,
        };
        render_template(&self.config.git.tag_format, &vars)
    }
}
