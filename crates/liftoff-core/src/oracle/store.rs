//! Persisted record of published content hashes
//!
//! On disk the store is pretty-printed JSON:
//!
//! ```json
//! {
//!   "packages": {
//!     "@scope/pkg": {
//!       "versions": { "1.0.0": "<hex digest>" },
//!       "lastVersion": "1.0.0"
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::hash::ContentHash;
use crate::error::{Result, StoreError};

/// Hashes recorded for one package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageHashRecord {
    /// Version string to the hash of the output published as that version
    #[serde(default)]
    pub versions: BTreeMap<String, String>,
    /// Most recently recorded version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_version: Option<String>,
}

/// All recorded packages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashStore {
    #[serde(default)]
    pub packages: BTreeMap<String, PackageHashRecord>,
}

impl HashStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store at `path`.
    ///
    /// A missing file or unparseable content both yield an empty store.
    /// Any other read failure (e.g. permission denied) is returned.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "hash store does not exist yet");
                return Ok(Self::new());
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                warn!(path = %path.display(), "hash store is not valid UTF-8, starting empty");
                return Ok(Self::new());
            }
            Err(e) => return Err(e.into()),
        };

        let store = Self::parse(&content);
        debug!(
            path = %path.display(),
            packages = store.packages.len(),
            "loaded hash store"
        );
        Ok(store)
    }

    /// Parse store content, falling back to an empty store on corruption
    pub fn parse(content: &str) -> Self {
        if content.trim().is_empty() {
            return Self::new();
        }
        match serde_json::from_str(content) {
            Ok(store) => store,
            Err(e) => {
                warn!(error = %e, "hash store is corrupt, treating it as empty");
                Self::new()
            }
        }
    }

    /// Serialize to pretty JSON with a trailing newline
    pub fn to_json(&self) -> std::result::Result<String, StoreError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Write the store to `path`, creating parent directories.
    ///
    /// Content goes to a temporary file in the same directory which is then
    /// renamed over `path`, so readers never observe a partial store.
    /// Concurrent writers are not coordinated: the last rename wins.
    pub fn persist(&self, path: &Path) -> std::result::Result<(), StoreError> {
        let write_err = |source: std::io::Error| StoreError::Write {
            path: path.to_path_buf(),
            source,
        };

        let json = self.to_json()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(write_err)?;

        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        temp.write_all(json.as_bytes()).map_err(write_err)?;
        temp.as_file().sync_all().map_err(write_err)?;
        temp.persist(path).map_err(|e| write_err(e.error))?;

        info!(path = %path.display(), packages = self.packages.len(), "persisted hash store");
        Ok(())
    }

    /// Record for one package
    pub fn package(&self, name: &str) -> Option<&PackageHashRecord> {
        self.packages.get(name)
    }

    /// Last recorded version for a package
    pub fn last_version(&self, name: &str) -> Option<&str> {
        self.package(name)?.last_version.as_deref()
    }

    /// First version (in version-string order) whose recorded hash matches
    pub fn find_version(&self, name: &str, hash: &ContentHash) -> Option<&str> {
        self.package(name)?
            .versions
            .iter()
            .find(|(_, recorded)| hash.matches(recorded))
            .map(|(version, _)| version.as_str())
    }

    /// Insert or overwrite `version -> hash` and mark it as the last version
    pub fn insert(&mut self, name: &str, version: &str, hash: &ContentHash) {
        let record = self.packages.entry(name.to_string()).or_default();
        if let Some(previous) = record
            .versions
            .insert(version.to_string(), hash.as_str().to_string())
        {
            if !hash.matches(&previous) {
                warn!(package = name, version, "overwriting recorded hash for version");
            }
        }
        record.last_version = Some(version.to_string());
    }
}
