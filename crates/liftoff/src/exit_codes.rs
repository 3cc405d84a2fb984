//! Exit codes for the CLI

use liftoff_core::{GitError, LiftoffError};

/// Success
pub const SUCCESS: u8 = 0;

/// General error
pub const ERROR: u8 = 1;

/// Configuration error
pub const CONFIG_ERROR: u8 = 2;

/// Git error
pub const GIT_ERROR: u8 = 3;

/// Version error
pub const VERSION_ERROR: u8 = 4;

/// Dependency graph error (cycle or unknown package)
pub const GRAPH_ERROR: u8 = 5;

/// Build, script or publish command failed
pub const STEP_ERROR: u8 = 6;

/// User cancelled
pub const CANCELLED: u8 = 130;

/// Returned when the user declines a confirmation prompt
#[derive(Debug)]
pub struct Cancelled;

impl std::fmt::Display for Cancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("aborted by user")
    }
}

impl std::error::Error for Cancelled {}

/// Pick the exit code for a failed command
pub fn for_error(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<Cancelled>().is_some() {
        return CANCELLED;
    }
    if err.downcast_ref::<GitError>().is_some() {
        return GIT_ERROR;
    }
    match err.downcast_ref::<LiftoffError>() {
        Some(LiftoffError::Config(_)) => CONFIG_ERROR,
        Some(LiftoffError::Git(_)) => GIT_ERROR,
        Some(LiftoffError::Version(_)) => VERSION_ERROR,
        Some(LiftoffError::Graph(_)) => GRAPH_ERROR,
        Some(LiftoffError::Workflow(_)) => STEP_ERROR,
        _ => ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftoff_core::GraphError;

    #[test]
    fn test_exit_code_mapping() {
        let cycle = LiftoffError::from(GraphError::Cycle {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        });
        assert_eq!(for_error(&cycle.into()), GRAPH_ERROR);

        let dirty = LiftoffError::from(GitError::DirtyWorkingDirectory);
        assert_eq!(for_error(&dirty.into()), GIT_ERROR);

        assert_eq!(for_error(&anyhow::Error::new(Cancelled)), CANCELLED);
        assert_eq!(for_error(&anyhow::anyhow!("boom")), ERROR);
    }
}
