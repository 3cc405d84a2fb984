//! Liftoff Git - Git operations for package publishing
//!
//! This crate provides the repository checks, release commits, tags and
//! pushes the publish workflow needs.

mod commit;
mod remote;
mod repository;
mod status;
mod tags;

pub use remote::git_push_release;
pub use repository::{GitRepo, Result};
