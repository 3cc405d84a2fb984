//! Release commits

use git2::IndexAddOption;
use tracing::{info, instrument};

use crate::repository::{GitRepo, Result};
use liftoff_core::error::GitError;

impl GitRepo {
    /// Stage every change in the working tree and commit it.
    ///
    /// Returns the new commit id, or [`GitError::NothingToCommit`] when the
    /// staged tree equals HEAD.
    #[instrument(skip(self))]
    pub fn commit_all(&self, message: &str) -> Result<String> {
        let mut index = self.repo.index()?;
        index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"], None)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let parent = self.head_commit()?;
        if parent.as_ref().map(|c| c.tree_id()) == Some(tree_id) {
            return Err(GitError::NothingToCommit);
        }

        let tree = self.repo.find_tree(tree_id)?;
        let sig = self.repo.signature()?;
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;

        info!(commit = %oid, "created release commit");
        Ok(oid.to_string())
    }
}
