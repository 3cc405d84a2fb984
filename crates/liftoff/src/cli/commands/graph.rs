//! Graph command

use clap::Args;
use serde::Serialize;
use tracing::info;

use liftoff_core::{DependencyGraph, GraphError, PackageNode};

use crate::cli::{output, Cli};

/// Show the package dependency order
#[derive(Debug, Args)]
pub struct GraphCommand {
    /// Only show the packages that must be built before this one
    #[arg(short, long)]
    pub target: Option<String>,
}

#[derive(Serialize)]
struct GraphEntry<'a> {
    name: &'a str,
    depends_on: &'a [String],
}

impl GraphCommand {
    /// Execute the graph command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(package = ?self.target, "executing graph command");
        let workspace = cli.workspace()?;
        let graph = DependencyGraph::new(workspace.config.package_nodes(&workspace.root));

        let order: Vec<&PackageNode> = match &self.target {
            Some(target) => {
                if !graph.contains(target) {
                    return Err(GraphError::UnknownPackage(target.clone()).into());
                }
                graph.dependency_order(target)
            }
            None => graph.topological_sort()?,
        };

        if cli.is_json() {
            let entries: Vec<_> = order
                .iter()
                .map(|node| GraphEntry {
                    name: &node.name,
                    depends_on: &node.depends_on,
                })
                .collect();
            return output::json(&entries);
        }

        if cli.quiet {
            return Ok(());
        }
        if order.is_empty() {
            match &self.target {
                Some(target) => output::info(&format!("{} has no workspace dependencies", target)),
                None => output::info("No packages configured"),
            }
            return Ok(());
        }

        for (i, node) in order.iter().enumerate() {
            let external = graph.external_dependencies(&node.name);
            let internal: Vec<_> = node
                .depends_on
                .iter()
                .map(String::as_str)
                .filter(|d| !external.contains(d))
                .collect();
            if internal.is_empty() {
                println!("{:>3}. {}", i + 1, node.name);
            } else {
                println!(
                    "{:>3}. {} {}",
                    i + 1,
                    node.name,
                    console::style(format!("(after {})", internal.join(", "))).dim()
                );
            }
        }
        Ok(())
    }
}
