//! Release workflow
//!
//! [`PublishWorkflow`] decides what happens and in which order; a
//! [`ReleaseSteps`] implementation performs the side effects.

mod publish;
mod steps;

pub use publish::*;
pub use steps::*;
