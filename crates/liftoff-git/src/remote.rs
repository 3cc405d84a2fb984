//! Pushing releases

use std::path::Path;
use std::process::Command;

use tracing::{info, instrument};

use crate::repository::{GitRepo, Result};
use liftoff_core::error::GitError;

impl GitRepo {
    /// Push HEAD and `tag` to `remote`
    pub fn push_release(&self, remote: &str, tag: &str) -> Result<()> {
        git_push_release(self.workdir(), remote, tag)
    }
}

/// Push HEAD and a tag with the git CLI, which picks up the user's credentials
#[instrument(skip(workdir))]
pub fn git_push_release(workdir: &Path, remote: &str, tag: &str) -> Result<()> {
    let start = std::time::Instant::now();
    let tag_ref = format!("refs/tags/{}", tag);
    let output = Command::new("git")
        .arg("-C")
        .arg(workdir)
        .args(["push", "--atomic", remote, "HEAD", &tag_ref])
        .output()
        .map_err(|e| GitError::PushFailed(format!("failed to run git: {}", e)))?;

    info!(
        remote,
        tag,
        duration_ms = start.elapsed().as_millis(),
        success = output.status.success(),
        "git push (CLI)"
    );

    if output.status.success() {
        Ok(())
    } else {
        Err(GitError::PushFailed(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup_repo;

    #[test]
    fn test_push_to_unknown_remote_fails() {
        let (_temp, repo) = setup_repo();
        repo.create_tag("core@1.0.0", "Release core@1.0.0").unwrap();
        assert!(matches!(
            repo.push_release("nowhere", "core@1.0.0"),
            Err(GitError::PushFailed(_))
        ));
    }
}
