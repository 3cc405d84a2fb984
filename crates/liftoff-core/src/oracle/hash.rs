//! Content hashing of build output directories

use std::fmt;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::walk::{walk_files, WalkEntry};
use crate::error::HashError;

/// Lowercase hex SHA-256 digest of a directory tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Length of the hex encoding
    pub const HEX_LEN: usize = 64;

    /// Wrap an already computed hex digest
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into().to_ascii_lowercase())
    }

    /// The hex string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for display
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }

    /// Compare against a stored hex digest, ignoring case
    pub fn matches(&self, hex: &str) -> bool {
        self.0.eq_ignore_ascii_case(hex)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

/// Streaming accumulator over `(relative path, content)` pairs.
///
/// Each file contributes its path and its bytes, both length-prefixed so
/// that no two different trees can produce the same input stream.
#[derive(Debug, Clone, Default)]
pub struct TreeHasher {
    hasher: Sha256,
    files: usize,
    bytes: u64,
}

impl TreeHasher {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one file whose content is already in memory
    pub fn add_bytes(&mut self, relative: &str, content: &[u8]) {
        self.add_path(relative);
        self.hasher.update((content.len() as u64).to_le_bytes());
        self.hasher.update(content);
        self.files += 1;
        self.bytes += content.len() as u64;
    }

    /// Feed one file from disk, streaming its content
    pub fn add_entry(&mut self, entry: &WalkEntry) -> Result<(), HashError> {
        let read_err = |source: io::Error| HashError::Read {
            path: entry.path().to_path_buf(),
            source,
        };

        let mut file = entry.open()?;
        let expected = file.metadata().map_err(read_err)?.len();

        self.add_path(entry.relative());
        self.hasher.update(expected.to_le_bytes());
        let copied = io::copy(&mut file, &mut self.hasher).map_err(read_err)?;
        if copied != expected {
            return Err(read_err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("file changed while hashing ({expected} bytes expected, {copied} read)"),
            )));
        }

        debug!(file = entry.relative(), bytes = copied, "hashed file");
        self.files += 1;
        self.bytes += copied;
        Ok(())
    }

    /// Number of files fed so far
    pub fn file_count(&self) -> usize {
        self.files
    }

    /// Total content bytes fed so far
    pub fn byte_count(&self) -> u64 {
        self.bytes
    }

    /// Finish and hex-encode the digest
    pub fn finish(self) -> ContentHash {
        ContentHash(format!("{:x}", self.hasher.finalize()))
    }

    fn add_path(&mut self, relative: &str) {
        self.hasher.update((relative.len() as u64).to_le_bytes());
        self.hasher.update(relative.as_bytes());
    }
}

/// Compute the content hash of every regular file below `path`.
///
/// Two trees with the same relative paths and bytes hash identically no
/// matter in which order they were created. Renaming, adding, removing or
/// editing any file changes the result.
pub fn hash_directory(path: &Path) -> Result<ContentHash, HashError> {
    let mut hasher = TreeHasher::new();
    for entry in walk_files(path)? {
        hasher.add_entry(&entry?)?;
    }

    info!(
        path = %path.display(),
        files = hasher.file_count(),
        bytes = hasher.byte_count(),
        "computed directory hash"
    );
    Ok(hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn sample_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.txt", "1");
        write(temp.path(), "sub/b.txt", "2");
        temp
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let temp = sample_tree();
        let hash = hash_directory(temp.path()).unwrap();

        assert_eq!(hash.as_str().len(), ContentHash::HEX_LEN);
        assert!(hash
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_creation_order_does_not_matter() {
        let first = sample_tree();

        let second = TempDir::new().unwrap();
        write(second.path(), "sub/b.txt", "2");
        write(second.path(), "a.txt", "1");

        assert_eq!(
            hash_directory(first.path()).unwrap(),
            hash_directory(second.path()).unwrap()
        );
    }

    #[test]
    fn test_rename_changes_hash() {
        let temp = sample_tree();
        let before = hash_directory(temp.path()).unwrap();

        fs::rename(temp.path().join("a.txt"), temp.path().join("c.txt")).unwrap();
        assert_ne!(before, hash_directory(temp.path()).unwrap());
    }

    #[test]
    fn test_content_change_changes_hash() {
        let temp = sample_tree();
        let before = hash_directory(temp.path()).unwrap();

        write(temp.path(), "sub/b.txt", "3");
        assert_ne!(before, hash_directory(temp.path()).unwrap());
    }

    #[test]
    fn test_add_and_remove_change_hash() {
        let temp = sample_tree();
        let before = hash_directory(temp.path()).unwrap();

        write(temp.path(), "new.txt", "");
        let added = hash_directory(temp.path()).unwrap();
        assert_ne!(before, added);

        fs::remove_file(temp.path().join("new.txt")).unwrap();
        fs::remove_file(temp.path().join("a.txt")).unwrap();
        let removed = hash_directory(temp.path()).unwrap();
        assert_ne!(before, removed);
        assert_ne!(added, removed);
    }

    #[test]
    fn test_moving_bytes_between_path_and_content() {
        let left = TempDir::new().unwrap();
        write(left.path(), "ab", "c");
        let right = TempDir::new().unwrap();
        write(right.path(), "a", "bc");

        assert_ne!(
            hash_directory(left.path()).unwrap(),
            hash_directory(right.path()).unwrap()
        );
    }

    #[test]
    fn test_empty_directories_are_ignored() {
        let temp = sample_tree();
        let before = hash_directory(temp.path()).unwrap();

        fs::create_dir_all(temp.path().join("empty")).unwrap();
        assert_eq!(before, hash_directory(temp.path()).unwrap());
    }

    #[test]
    fn test_streaming_matches_in_memory() {
        let temp = sample_tree();

        let mut hasher = TreeHasher::new();
        hasher.add_bytes("a.txt", b"1");
        hasher.add_bytes("sub/b.txt", b"2");

        assert_eq!(hasher.finish(), hash_directory(temp.path()).unwrap());
    }

    #[test]
    fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        let result = hash_directory(&temp.path().join("dist"));
        assert!(matches!(result, Err(HashError::DirectoryNotFound(_))));
    }

    #[test]
    fn test_content_hash_matches_ignores_case() {
        let hash = ContentHash::from_hex("ABCDEF");
        assert_eq!(hash.as_str(), "abcdef");
        assert!(hash.matches("AbCdEf"));
        assert_eq!(hash.short(), "abcdef");
    }
}
