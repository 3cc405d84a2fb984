//! Shell command execution for builds, scripts and publishing

use std::collections::HashMap;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;

use tracing::{debug, info};

use crate::error::{Result, WorkflowError};

/// Captured result of a shell command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// The command that was run
    pub command: String,
    /// Whether execution succeeded
    pub success: bool,
    /// Exit code if available
    pub exit_code: Option<i32>,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// Execution time in milliseconds
    pub duration_ms: u64,
}

impl CommandOutput {
    /// Last non-empty line of stdout
    pub fn last_line(&self) -> Option<&str> {
        self.stdout.lines().map(str::trim).filter(|l| !l.is_empty()).last()
    }

    /// Turn a failed run into a step error
    pub fn check(self, step: &str) -> Result<Self> {
        if self.success {
            return Ok(self);
        }
        let detail = if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        };
        let code = self
            .exit_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        Err(WorkflowError::StepFailed {
            step: step.to_string(),
            reason: format!("`{}` exited with {}: {}", self.command, code, detail),
        }
        .into())
    }
}

/// Run `command` through the platform shell in `cwd`
pub fn run_shell(
    command: &str,
    cwd: &Path,
    env: &HashMap<String, String>,
) -> Result<CommandOutput> {
    let start = Instant::now();
    debug!(command, cwd = %cwd.display(), "running command");

    let shell = if cfg!(windows) { "cmd" } else { "sh" };
    let shell_arg = if cfg!(windows) { "/C" } else { "-c" };

    let mut cmd = Command::new(shell);
    cmd.arg(shell_arg).arg(command).current_dir(cwd);
    for (k, v) in env {
        cmd.env(k, v);
    }
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let output = cmd.output().map_err(|e| WorkflowError::StepFailed {
        step: "exec".to_string(),
        reason: format!("failed to spawn `{}`: {}", command, e),
    })?;

    let duration_ms = start.elapsed().as_millis() as u64;
    info!(
        command,
        success = output.status.success(),
        duration_ms,
        "command finished"
    );

    Ok(CommandOutput {
        command: command.to_string(),
        success: output.status.success(),
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        duration_ms,
    })
}

/// Values substituted into command and git templates
#[derive(Debug, Clone, Default)]
pub struct TemplateVars<'a> {
    /// Package name
    pub name: &'a str,
    /// Version, once known
    pub version: Option<&'a str>,
    /// Requested bump
    pub bump: Option<&'a str>,
}

/// Replace `{name}`, `{version}` and `{bump}` placeholders
pub fn render_template(template: &str, vars: &TemplateVars<'_>) -> String {
    let mut out = template.replace("{name}", vars.name);
    if let Some(version) = vars.version {
        out = out.replace("{version}", version);
    }
    if let Some(bump) = vars.bump {
        out = out.replace("{bump}", bump);
    }
    out
}

/// Environment exported to every command
pub fn command_env(vars: &TemplateVars<'_>, dry_run: bool) -> HashMap<String, String> {
    let mut env = HashMap::new();
    env.insert("LIFTOFF_PACKAGE".to_string(), vars.name.to_string());
    if let Some(version) = vars.version {
        env.insert("LIFTOFF_VERSION".to_string(), version.to_string());
    }
    if let Some(bump) = vars.bump {
        env.insert("LIFTOFF_BUMP".to_string(), bump.to_string());
    }
    env.insert("LIFTOFF_DRY_RUN".to_string(), dry_run.to_string());
    env
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_template() {
        let vars = TemplateVars {
            name: "@acme/core",
            version: Some("1.2.0"),
            bump: Some("minor"),
        };
        assert_eq!(
            render_template("chore(release): {name}@{version} ({bump})", &vars),
            "chore(release): @acme/core@1.2.0 (minor)"
        );
    }

    #[test]
    fn test_render_template_leaves_unknown_values() {
        let vars = TemplateVars {
            name: "core",
            ..Default::default()
        };
        assert_eq!(render_template("{name}@{version}", &vars), "core@{version}");
    }

    #[test]
    fn test_command_env() {
        let vars = TemplateVars {
            name: "core",
            version: Some("1.0.0"),
            bump: None,
        };
        let env = command_env(&vars, true);
        assert_eq!(env["LIFTOFF_PACKAGE"], "core");
        assert_eq!(env["LIFTOFF_VERSION"], "1.0.0");
        assert_eq!(env["LIFTOFF_DRY_RUN"], "true");
        assert!(!env.contains_key("LIFTOFF_BUMP"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_shell_captures_output() {
        let temp = TempDir::new().unwrap();
        let mut env = HashMap::new();
        env.insert("GREETING".to_string(), "hello".to_string());

        let output = run_shell("echo $GREETING; echo 1.2.3", temp.path(), &env).unwrap();
        assert!(output.success);
        assert_eq!(output.exit_code, Some(0));
        assert_eq!(output.last_line(), Some("1.2.3"));
        assert!(output.stdout.starts_with("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_command_check() {
        let temp = TempDir::new().unwrap();
        let output = run_shell("echo boom >&2; exit 3", temp.path(), &HashMap::new()).unwrap();
        assert!(!output.success);

        let err = output.check("build").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("build"));
        assert!(message.contains("exited with 3"));
        assert!(message.contains("boom"));
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_in_cwd() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker.txt"), "").unwrap();

        let output = run_shell("ls", temp.path(), &HashMap::new()).unwrap();
        assert!(output.stdout.contains("marker.txt"));
    }
}
