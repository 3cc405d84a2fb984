//! Repository handle

use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::{debug, instrument};

use liftoff_core::error::GitError;

/// Result type for git operations
pub type Result<T> = std::result::Result<T, GitError>;

/// An opened git repository with a working tree
pub struct GitRepo {
    pub(crate) repo: Repository,
    workdir: PathBuf,
}

impl GitRepo {
    /// Open the repository rooted exactly at `path`
    #[instrument(fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::open(path).map_err(|e| map_open_error(e, path))?;
        Self::from_repository(repo, path)
    }

    /// Open the repository containing `start`, searching parent directories
    #[instrument(fields(start = %start.display()))]
    pub fn discover(start: &Path) -> Result<Self> {
        let repo = Repository::discover(start).map_err(|e| map_open_error(e, start))?;
        Self::from_repository(repo, start)
    }

    fn from_repository(repo: Repository, requested: &Path) -> Result<Self> {
        let workdir = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| GitError::NotARepository(requested.to_path_buf()))?;
        debug!(workdir = %workdir.display(), "opened git repository");
        Ok(Self { repo, workdir })
    }

    /// Working tree root
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// The HEAD commit, or `None` before the first commit
    pub(crate) fn head_commit(&self) -> Result<Option<git2::Commit<'_>>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => Ok(None),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn map_open_error(error: git2::Error, path: &Path) -> GitError {
    if error.code() == git2::ErrorCode::NotFound {
        GitError::NotARepository(path.to_path_buf())
    } else {
        GitError::OpenFailed(error.to_string())
    }
}
