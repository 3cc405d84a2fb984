//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ConfigError, Result};

use super::defaults::config_file_names;
use super::types::Config;
use super::validation::validate_config;

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<Config> {
    let format = if path.extension().is_some_and(|e| e == "toml") {
        "TOML"
    } else {
        "YAML"
    };
    info!(path = %path.display(), format, "loading config");

    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
        _ => ConfigError::Io(e),
    })?;

    let config: Config = if format == "TOML" {
        toml::from_str(&content).map_err(ConfigError::TomlError)?
    } else {
        serde_yaml::from_str(&content).map_err(ConfigError::YamlError)?
    };

    validate_config(&config)?;
    debug!(path = %path.display(), packages = config.packages.len(), "config loaded and validated");
    Ok(config)
}

/// Find configuration file in directory or parent directories.
///
/// At each directory level the search checks:
///   1. `<dir>/<name>`          (e.g. `liftoff.toml`)
///   2. `<dir>/.github/<name>`  (e.g. `.github/liftoff.toml`)
///
/// The first match wins. Parents are walked until the filesystem root.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for config file");
    let mut current = start_dir.to_path_buf();

    loop {
        for name in config_file_names() {
            let config_path = current.join(name);
            if config_path.exists() {
                info!(path = %config_path.display(), "found config file");
                return Some(config_path);
            }

            let github_path = current.join(".github").join(name);
            if github_path.exists() {
                info!(path = %github_path.display(), "found config file in .github/");
                return Some(github_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    debug!("no config file found");
    None
}

/// Directory that relative paths in a config file resolve against
pub fn config_root(config_path: &Path) -> PathBuf {
    let dir = config_path.parent().unwrap_or(Path::new("."));
    if dir.file_name().is_some_and(|n| n == ".github") {
        dir.parent().unwrap_or(dir).to_path_buf()
    } else {
        dir.to_path_buf()
    }
}

/// Load configuration or use defaults.
///
/// Only a missing file falls back to defaults; a config that exists but
/// fails to parse or validate is returned as an error.
pub fn load_config_or_default(dir: &Path) -> Result<(Config, Option<PathBuf>)> {
    load_found(dir, find_config(dir))
}

fn load_found(dir: &Path, found: Option<PathBuf>) -> Result<(Config, Option<PathBuf>)> {
    match found {
        Some(path) => {
            let config = load_config(&path)?;
            Ok((config, Some(path)))
        }
        None => {
            warn!(dir = %dir.display(), "no config found, using defaults");
            Ok((Config::default(), None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("liftoff.toml");
        std::fs::write(&config_path, "output_dir = \"build\"").unwrap();

        let found = find_config(temp.path());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_prefers_toml_over_yaml() {
        let temp = TempDir::new().unwrap();
        let toml_path = temp.path().join("liftoff.toml");
        std::fs::write(&toml_path, "output_dir = \"build\"").unwrap();
        std::fs::write(temp.path().join("liftoff.yaml"), "output_dir: build").unwrap();

        assert_eq!(find_config(temp.path()).unwrap(), toml_path);
    }

    #[test]
    fn test_find_config_in_parent_and_github_dir() {
        let temp = TempDir::new().unwrap();
        let github_dir = temp.path().join(".github");
        std::fs::create_dir_all(&github_dir).unwrap();
        let config_path = github_dir.join("liftoff.toml");
        std::fs::write(&config_path, "").unwrap();

        let nested = temp.path().join("packages").join("core");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config(&nested).unwrap(), config_path);
        assert_eq!(config_root(&config_path), temp.path());
    }

    #[test]
    fn test_load_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("liftoff.toml");
        std::fs::write(
            &config_path,
            r#"
output_dir = "build"
scripts = ["npm test"]

[commands]
build = "pnpm build"

[[packages]]
name = "core"
path = "packages/core"
"#,
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("build"));
        assert_eq!(config.commands.build, "pnpm build");
        assert_eq!(config.commands.publish, "npm publish");
        assert_eq!(config.scripts, vec!["npm test"]);
        assert_eq!(config.packages[0].name, "core");
    }

    #[test]
    fn test_load_config_yaml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("liftoff.yaml");
        std::fs::write(
            &config_path,
            r#"
git:
  push: true
packages:
  - name: cli
    path: packages/cli
    depends_on: [core]
"#,
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert!(config.git.push);
        assert_eq!(config.packages[0].depends_on, vec!["core"]);
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = load_config(&temp.path().join("liftoff.toml"));
        assert!(matches!(
            result,
            Err(crate::error::LiftoffError::Config(ConfigError::NotFound(_)))
        ));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("liftoff.toml"), "git = 3").unwrap();

        assert!(load_config_or_default(temp.path()).is_err());
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let temp = TempDir::new().unwrap();

        let (config, path) = load_found(temp.path(), None).unwrap();
        assert!(path.is_none());
        assert!(!config.is_monorepo());
        assert_eq!(config.output_dir, PathBuf::from("dist"));
    }

    #[test]
    fn test_found_config_is_loaded() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("liftoff.toml");
        std::fs::write(&config_path, "output_dir = \"out\"\n").unwrap();

        let (config, path) = load_found(temp.path(), Some(config_path.clone())).unwrap();
        assert_eq!(path, Some(config_path));
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }
}
