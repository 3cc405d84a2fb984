//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::graph::PackageNode;

/// Main configuration for Liftoff
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Package name in single-package mode
    pub name: Option<String>,

    /// Build output directory, relative to each package
    pub output_dir: PathBuf,

    /// Hash store configuration
    pub store: StoreConfig,

    /// Git configuration
    pub git: GitConfig,

    /// External commands
    pub commands: CommandsConfig,

    /// Validation scripts run after building
    pub scripts: Vec<String>,

    /// Monorepo packages; empty means single-package mode
    pub packages: Vec<PackageConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: None,
            output_dir: PathBuf::from("dist"),
            store: StoreConfig::default(),
            git: GitConfig::default(),
            commands: CommandsConfig::default(),
            scripts: Vec::new(),
            packages: Vec::new(),
        }
    }
}

impl Config {
    /// Whether packages are declared explicitly
    pub fn is_monorepo(&self) -> bool {
        !self.packages.is_empty()
    }

    /// Find a declared package by name; the last declaration wins
    pub fn package(&self, name: &str) -> Option<&PackageConfig> {
        self.packages.iter().rev().find(|p| p.name == name)
    }

    /// Hash store location below `root`
    pub fn store_path(&self, root: &Path) -> PathBuf {
        root.join(&self.store.path)
    }

    /// Graph nodes for the declared packages, with paths resolved under `root`
    pub fn package_nodes(&self, root: &Path) -> Vec<PackageNode> {
        self.packages
            .iter()
            .map(|p| {
                PackageNode::new(&p.name, root.join(&p.path))
                    .with_dependencies(p.depends_on.iter().cloned())
            })
            .collect()
    }
}

/// Hash store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store file path, relative to the config root
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".liftoff/hashes.json"),
        }
    }
}

/// Git configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Whether to commit and tag releases
    pub enabled: bool,

    /// Whether to require clean working directory
    pub require_clean: bool,

    /// Commit message template
    pub commit_message: String,

    /// Tag format (e.g., "{name}@{version}")
    pub tag_format: String,

    /// Whether to push the commit and tag after publishing
    pub push: bool,

    /// Remote name
    pub remote: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            require_clean: true,
            commit_message: "chore(release): {name}@{version}".to_string(),
            tag_format: "{name}@{version}".to_string(),
            push: false,
            remote: "origin".to_string(),
        }
    }
}

/// Package manager commands, with `{name}`, `{version}` and `{bump}` placeholders
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// Build a package
    pub build: String,

    /// Bump the manifest version; must print the new version last
    pub version: String,

    /// Publish a package to its registry
    pub publish: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            build: "npm run build".to_string(),
            version: "npm version {bump} --no-git-tag-version".to_string(),
            publish: "npm publish".to_string(),
        }
    }
}

/// Package configuration (for monorepos)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
    /// Package name
    pub name: String,

    /// Package path, relative to the config root
    pub path: PathBuf,

    /// Names of packages this one depends on
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Output directory override
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Validation scripts override
    #[serde(default)]
    pub scripts: Option<Vec<String>>,
}
