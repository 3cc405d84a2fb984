//! Release tags

use tracing::{info, instrument};

use crate::repository::{GitRepo, Result};
use liftoff_core::error::GitError;

impl GitRepo {
    /// Whether a tag named `name` exists
    pub fn tag_exists(&self, name: &str) -> Result<bool> {
        match self.repo.find_reference(&format!("refs/tags/{}", name)) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(false),
            Err(e) => Err(GitError::Git2(e)),
        }
    }

    /// Create an annotated tag at HEAD and return the commit it points to
    #[instrument(skip(self, message))]
    pub fn create_tag(&self, name: &str, message: &str) -> Result<String> {
        if self.tag_exists(name)? {
            return Err(GitError::TagExists(name.to_string()));
        }

        let head = self.head_commit()?.ok_or_else(|| {
            GitError::OpenFailed("cannot tag a repository without commits".to_string())
        })?;
        let sig = self.repo.signature()?;
        self.repo.tag(name, head.as_object(), &sig, message, false)?;

        info!(tag = name, commit = %head.id(), "created tag");
        Ok(head.id().to_string())
    }
}
