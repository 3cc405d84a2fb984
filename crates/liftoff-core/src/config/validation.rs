//! Configuration validation

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_git(config)?;
    validate_commands(config)?;
    validate_packages(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.into(),
        message: message.into(),
    }
}

fn validate_git(config: &Config) -> Result<()> {
    if !config.git.tag_format.contains("{version}") {
        return Err(invalid("git.tag_format", "must contain {version} placeholder").into());
    }

    if !config.git.commit_message.contains("{version}") {
        return Err(invalid("git.commit_message", "must contain {version} placeholder").into());
    }

    if config.git.push && config.git.remote.is_empty() {
        return Err(invalid("git.remote", "remote cannot be empty when push is enabled").into());
    }

    Ok(())
}

fn validate_commands(config: &Config) -> Result<()> {
    let commands = [
        ("commands.build", &config.commands.build),
        ("commands.version", &config.commands.version),
        ("commands.publish", &config.commands.publish),
    ];
    for (field, command) in commands {
        if command.trim().is_empty() {
            return Err(invalid(field, "command cannot be empty").into());
        }
    }

    for (i, script) in config.scripts.iter().enumerate() {
        if script.trim().is_empty() {
            return Err(invalid(format!("scripts[{}]", i), "script cannot be empty").into());
        }
    }

    Ok(())
}

fn validate_packages(config: &Config) -> Result<()> {
    let mut seen = HashSet::new();

    for (i, package) in config.packages.iter().enumerate() {
        if package.name.trim().is_empty() {
            let field = format!("packages[{}].name", i);
            return Err(invalid(field, "package name cannot be empty").into());
        }

        if !seen.insert(package.name.as_str()) {
            warn!(package = %package.name, "package declared more than once, the last entry wins");
        }

        if package.depends_on.iter().any(|d| d == &package.name) {
            return Err(invalid(
                format!("packages[{}].depends_on", i),
                "package cannot depend on itself",
            )
            .into());
        }
    }

    Ok(())
}
