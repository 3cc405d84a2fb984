//! Error types for Liftoff

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using LiftoffError
pub type Result<T> = std::result::Result<T, LiftoffError>;

/// Main error type for Liftoff operations
#[derive(Debug, Error)]
pub enum LiftoffError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Directory hashing errors
    #[error(transparent)]
    Hash(#[from] HashError),

    /// Hash store persistence errors
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Dependency graph errors
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Git-related errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// Version-related errors
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Workflow-related errors
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while fingerprinting a directory
#[derive(Debug, Error)]
pub enum HashError {
    /// The directory to hash does not exist
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// Traversal failed (permission denied, symlink loop, ...)
    #[error("Failed to walk {path}: {reason}")]
    Walk { path: PathBuf, reason: String },

    /// A file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Hash store write errors.
///
/// Reading never fails on content: a corrupt store is treated as empty.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to write the store file
    #[error("Failed to write hash store {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize the store
    #[error("Failed to serialize hash store: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Dependency graph errors
#[derive(Debug, Error)]
pub enum GraphError {
    /// The graph cannot be ordered
    #[error("circular dependency detected: {}", .cycle.join(" -> "))]
    Cycle { cycle: Vec<String> },

    /// Requested package is not part of the configured graph
    #[error("Unknown package: {0}")]
    UnknownPackage(String),
}

/// Git-related errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Not a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// Failed to open repository
    #[error("Failed to open repository: {0}")]
    OpenFailed(String),

    /// Tag already exists
    #[error("Tag already exists: {0}")]
    TagExists(String),

    /// Working directory is not clean
    #[error("Working directory has uncommitted changes")]
    DirtyWorkingDirectory,

    /// Nothing staged for the release commit
    #[error("Nothing to commit")]
    NothingToCommit,

    /// Failed to push
    #[error("Failed to push to remote: {0}")]
    PushFailed(String),

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}

/// Version-related errors
#[derive(Debug, Error)]
pub enum VersionError {
    /// Failed to parse version
    #[error("Failed to parse version '{0}': {1}")]
    ParseFailed(String, String),
}

/// Workflow-related errors
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Pre-condition not met
    #[error("Pre-condition not met: {0}")]
    PreConditionFailed(String),

    /// Step failed
    #[error("Workflow step '{step}' failed: {reason}")]
    StepFailed { step: String, reason: String },
}
