//! Deterministic directory traversal
//!
//! Yields every regular file below a root in depth-first order, with the
//! entries of each directory sorted by file name before descending. The
//! sequence is lazy: file contents are only read when a consumer asks.

use std::fs::File;
use std::path::{Component, Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::HashError;

/// A regular file found below the walked root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    relative: String,
    path: PathBuf,
}

impl WalkEntry {
    /// Path relative to the walked root, always `/`-separated
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Absolute (or root-prefixed) path on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the file for streaming reads
    pub fn open(&self) -> Result<File, HashError> {
        File::open(&self.path).map_err(|source| HashError::Read {
            path: self.path.clone(),
            source,
        })
    }

    /// Read the whole file into memory
    pub fn read(&self) -> Result<Vec<u8>, HashError> {
        std::fs::read(&self.path).map_err(|source| HashError::Read {
            path: self.path.clone(),
            source,
        })
    }
}

/// Lazy iterator over the regular files of a directory tree.
///
/// Symbolic links are followed, so a link to a file is hashed as that file
/// and a link to a directory is traversed. Link loops surface as
/// [`HashError::Walk`]. Sockets, FIFOs and device files are skipped.
pub struct DirWalker {
    root: PathBuf,
    inner: walkdir::IntoIter,
}

impl DirWalker {
    /// Start walking `root`; fails if it is missing or not a directory
    pub fn new(root: &Path) -> Result<Self, HashError> {
        if !root.is_dir() {
            return Err(HashError::DirectoryNotFound(root.to_path_buf()));
        }

        let inner = WalkDir::new(root)
            .min_depth(1)
            .follow_links(true)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
            .into_iter();

        Ok(Self {
            root: root.to_path_buf(),
            inner,
        })
    }

    /// The directory being walked
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Iterator for DirWalker {
    type Item = Result<WalkEntry, HashError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    return Some(Err(HashError::Walk {
                        path,
                        reason: e.to_string(),
                    }));
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }
            if !file_type.is_file() {
                debug!(path = %entry.path().display(), "skipping non-regular file");
                continue;
            }

            let relative = relative_path(&self.root, entry.path());
            return Some(Ok(WalkEntry {
                relative,
                path: entry.into_path(),
            }));
        }
    }
}

/// Walk `root` and collect every regular file in traversal order
pub fn walk_files(root: &Path) -> Result<DirWalker, HashError> {
    DirWalker::new(root)
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
