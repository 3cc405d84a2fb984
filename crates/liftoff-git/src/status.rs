//! Working tree status

use git2::{Status, StatusOptions};

use crate::repository::{GitRepo, Result};
use liftoff_core::error::GitError;

impl GitRepo {
    /// Paths with uncommitted changes, untracked files included
    pub fn changed_files(&self) -> Result<Vec<String>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true).include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        Ok(statuses
            .iter()
            .filter(|entry| entry.status() != Status::CURRENT && !entry.status().is_ignored())
            .filter_map(|entry| entry.path().map(str::to_string))
            .collect())
    }

    /// Whether the working tree has no uncommitted changes
    pub fn is_clean(&self) -> Result<bool> {
        Ok(self.changed_files()?.is_empty())
    }

    /// Fail with [`GitError::DirtyWorkingDirectory`] unless clean
    pub fn ensure_clean(&self) -> Result<()> {
        let changed = self.changed_files()?;
        if changed.is_empty() {
            Ok(())
        } else {
            tracing::warn!(files = ?changed, "working directory has uncommitted changes");
            Err(GitError::DirtyWorkingDirectory)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup_repo;

    #[test]
    fn test_clean_after_commit() {
        let (_temp, repo) = setup_repo();
        assert!(repo.is_clean().unwrap());
        assert!(repo.ensure_clean().is_ok());
    }

    #[test]
    fn test_untracked_file_is_dirty() {
        let (temp, repo) = setup_repo();
        std::fs::write(temp.path().join("notes.md"), "wip").unwrap();

        assert!(!repo.is_clean().unwrap());
        assert_eq!(repo.changed_files().unwrap(), vec!["notes.md"]);
        assert!(matches!(
            repo.ensure_clean(),
            Err(GitError::DirtyWorkingDirectory)
        ));
    }

    #[test]
    fn test_ignored_files_do_not_count() {
        let (temp, repo) = setup_repo();
        std::fs::write(temp.path().join(".gitignore"), "dist/\n").unwrap();
        std::fs::create_dir(temp.path().join("dist")).unwrap();
        std::fs::write(temp.path().join("dist/index.js"), "x").unwrap();

        assert_eq!(repo.changed_files().unwrap(), vec![".gitignore"]);
    }

    #[test]
    fn test_modified_file_is_dirty() {
        let (temp, repo) = setup_repo();
        std::fs::write(temp.path().join("package.json"), "{\"version\":\"1.1.0\"}").unwrap();
        assert!(!repo.is_clean().unwrap());
    }
}
