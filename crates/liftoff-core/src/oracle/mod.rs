//! Change oracle: has this exact build output already been published?
//!
//! - [`walk`] enumerates a tree in a fixed, sorted order
//! - [`hash`] folds that sequence into a [`ContentHash`]
//! - [`store`] persists `(package, version) -> hash` between runs
//!
//! The functions here are pure over an explicit [`HashStore`] value; loading
//! and persisting the store are separate steps owned by the caller.

pub mod hash;
pub mod store;
pub mod walk;

use serde::Serialize;
use tracing::debug;

pub use hash::{hash_directory, ContentHash, TreeHasher};
pub use store::{HashStore, PackageHashRecord};
pub use walk::{walk_files, DirWalker, WalkEntry};

/// Outcome of a duplicate lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateCheck {
    /// Whether the hash was already published for this package
    pub is_duplicate: bool,
    /// A version that was published with this hash
    pub existing_version: Option<String>,
}

/// Look for a recorded version of `package` whose hash equals `hash`.
///
/// When several versions share the hash, the lowest version string (in
/// byte order) is reported.
pub fn is_duplicate(store: &HashStore, package: &str, hash: &ContentHash) -> DuplicateCheck {
    let existing_version = store.find_version(package, hash).map(str::to_string);
    debug!(
        package,
        hash = hash.short(),
        existing = ?existing_version,
        "duplicate check"
    );
    DuplicateCheck {
        is_duplicate: existing_version.is_some(),
        existing_version,
    }
}

/// Record that `version` of `package` was published with `hash`
pub fn record_publish(
    mut store: HashStore,
    package: &str,
    version: &str,
    hash: &ContentHash,
) -> HashStore {
    store.insert(package, version, hash);
    store
}
