//! CLI commands

mod check;
mod completions;
mod graph;
mod hash;
mod init;
mod publish;
mod store;

pub use check::CheckCommand;
pub use completions::CompletionsCommand;
pub use graph::GraphCommand;
pub use hash::HashCommand;
pub use init::InitCommand;
pub use publish::PublishCommand;
pub use store::StoreCommand;
