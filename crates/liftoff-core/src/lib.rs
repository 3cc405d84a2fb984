//! Liftoff Core - Core library for content-aware package publishing
//!
//! This crate provides the change oracle (directory hashing and the hash
//! store), dependency ordering, configuration, and the publish workflow
//! for the Liftoff publish tool.

pub mod config;
pub mod error;
pub mod exec;
pub mod graph;
pub mod oracle;
pub mod version;
pub mod workflow;

pub use error::{
    ConfigError, GitError, GraphError, HashError, LiftoffError, Result, StoreError, VersionError,
    WorkflowError,
};
pub use graph::{DependencyGraph, PackageNode};
pub use oracle::{
    hash_directory, is_duplicate, record_publish, ContentHash, DuplicateCheck, HashStore,
};
pub use version::{next_version, parse_version, BumpType};
pub use workflow::{
    CheckReport, PublishOutcome, PublishPlan, PublishReport, PublishRequest, PublishWorkflow,
    ReleaseSteps, ResolvedPackage,
};
