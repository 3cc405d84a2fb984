//! External operations driven by the publish workflow

use std::path::PathBuf;

use serde::Serialize;

use crate::error::Result;
use crate::version::BumpType;

/// A package with every path resolved for one publish run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPackage {
    /// Package name
    pub name: String,
    /// Package directory
    pub path: PathBuf,
    /// Build output directory that gets hashed
    pub output_dir: PathBuf,
    /// Validation scripts to run before hashing
    pub scripts: Vec<String>,
}

/// The side-effecting collaborators of a publish.
///
/// Each operation either succeeds or returns the reason it failed. The
/// workflow owns ordering; implementations own how the work is done.
pub trait ReleaseSteps {
    /// Fail unless the working tree has no uncommitted changes
    fn ensure_clean(&mut self) -> Result<()>;

    /// Build one package
    fn build(&mut self, package: &ResolvedPackage) -> Result<()>;

    /// Run a validation script in the package directory
    fn run_script(&mut self, script: &str, package: &ResolvedPackage) -> Result<()>;

    /// Bump the package manifest and return the new version
    fn bump_version(
        &mut self,
        package: &ResolvedPackage,
        bump: BumpType,
        preid: Option<&str>,
    ) -> Result<String>;

    /// Stage all changes and commit them
    fn commit(&mut self, message: &str) -> Result<()>;

    /// Create an annotated tag at HEAD
    fn tag(&mut self, name: &str, message: &str) -> Result<()>;

    /// Publish the package to its registry
    fn publish(&mut self, package: &ResolvedPackage, version: &str) -> Result<()>;

    /// Push the release commit and tag
    fn push(&mut self, tag: &str) -> Result<()>;
}
