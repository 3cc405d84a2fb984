//! Dependency graph for monorepo packages

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GraphError;

/// A package and the names it depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageNode {
    /// Package name
    pub name: String,
    /// Package location
    pub path: PathBuf,
    /// Declared dependencies; names outside the graph are external
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl PackageNode {
    /// Create a node with no dependencies
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            depends_on: Vec::new(),
        }
    }

    /// Add dependencies
    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(deps.into_iter().map(Into::into));
        self
    }
}

/// Package graph for one resolution session
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Nodes in input order
    nodes: Vec<PackageNode>,
    /// Name to position in `nodes`
    index: HashMap<String, usize>,
}

impl DependencyGraph {
    /// Build a graph from caller-supplied nodes.
    ///
    /// A repeated name replaces the earlier node's contents but keeps the
    /// earlier node's position. Repeated entries within one `depends_on`
    /// list are collapsed.
    pub fn new<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = PackageNode>,
    {
        let mut graph = Self::default();
        for mut node in nodes {
            let mut seen = HashSet::new();
            node.depends_on.retain(|dep| seen.insert(dep.clone()));

            match graph.index.get(&node.name) {
                Some(&pos) => {
                    warn!(
                        package = %node.name,
                        "duplicate package name, keeping the last definition"
                    );
                    graph.nodes[pos] = node;
                }
                None => {
                    graph.index.insert(node.name.clone(), graph.nodes.len());
                    graph.nodes.push(node);
                }
            }
        }
        debug!(packages = graph.nodes.len(), "built dependency graph");
        graph
    }

    /// Number of packages
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no packages
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All packages in input order
    pub fn nodes(&self) -> &[PackageNode] {
        &self.nodes
    }

    /// Look up a package by name
    pub fn get(&self, name: &str) -> Option<&PackageNode> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    /// Whether `name` is a package of this graph
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Declared dependencies of `name` that are not part of the graph
    pub fn external_dependencies(&self, name: &str) -> Vec<&str> {
        self.get(name)
            .map(|node| {
                node.depends_on
                    .iter()
                    .filter(|dep| !self.contains(dep))
                    .map(String::as_str)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Positions of in-graph dependencies of the node at `pos`
    fn known_deps(&self, pos: usize) -> impl Iterator<Item = usize> + '_ {
        self.nodes[pos]
            .depends_on
            .iter()
            .filter_map(|dep| self.index.get(dep).copied())
    }

    /// Order every package after all of its in-graph dependencies.
    ///
    /// Kahn's algorithm with a FIFO ready queue. The queue is seeded in
    /// input order and newly ready packages are enqueued in input order, so
    /// the result is the same on every run.
    pub fn topological_sort(&self) -> Result<Vec<&PackageNode>, GraphError> {
        let count = self.nodes.len();
        let mut in_degree = vec![0usize; count];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];

        for pos in 0..count {
            for dep in self.known_deps(pos) {
                in_degree[pos] += 1;
                dependents[dep].push(pos);
            }
        }

        let mut queue: VecDeque<usize> = (0..count).filter(|&i| in_degree[i] == 0).collect();
        let mut sorted = Vec::with_capacity(count);

        while let Some(pos) = queue.pop_front() {
            sorted.push(&self.nodes[pos]);
            for &dependent in &dependents[pos] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    queue.push_back(dependent);
                }
            }
        }

        if sorted.len() < count {
            let stuck: Vec<usize> = (0..count).filter(|&i| in_degree[i] > 0).collect();
            let cycle = self
                .find_cycle(&stuck)
                .unwrap_or_else(|| stuck.iter().map(|&i| self.nodes[i].name.clone()).collect());
            warn!(cycle = %cycle.join(" -> "), "dependency graph has a cycle");
            return Err(GraphError::Cycle { cycle });
        }

        Ok(sorted)
    }

    /// Find one cycle among the packages Kahn's algorithm could not place.
    ///
    /// Returns the member names with the first one repeated at the end.
    fn find_cycle(&self, stuck: &[usize]) -> Option<Vec<String>> {
        let candidates: HashSet<usize> = stuck.iter().copied().collect();

        for &start in stuck {
            let mut visited: HashSet<usize> = HashSet::from([start]);
            // (node, index of next dependency to try)
            let mut stack: Vec<(usize, usize)> = vec![(start, 0)];

            while let Some(frame) = stack.last_mut() {
                let (pos, next) = *frame;
                let dep = self
                    .known_deps(pos)
                    .filter(|d| candidates.contains(d))
                    .nth(next);

                match dep {
                    Some(dep) if dep == start => {
                        let mut names: Vec<String> = stack
                            .iter()
                            .map(|&(i, _)| self.nodes[i].name.clone())
                            .collect();
                        names.push(self.nodes[start].name.clone());
                        return Some(names);
                    }
                    Some(dep) => {
                        frame.1 += 1;
                        if visited.insert(dep) {
                            stack.push((dep, 0));
                        }
                    }
                    None => {
                        stack.pop();
                    }
                }
            }
        }

        None
    }

    /// Transitive in-graph dependencies of `target`, dependencies first.
    ///
    /// The target itself is excluded, and an unknown target yields an empty
    /// list. Traversal is depth-first post-order over declared dependencies.
    /// A cycle reachable from the target does not fail here: every package is
    /// emitted at most once and the order within the cycle is whatever the
    /// traversal reaches first. Call [`Self::topological_sort`] to reject
    /// cyclic graphs.
    pub fn dependency_order(&self, target: &str) -> Vec<&PackageNode> {
        let Some(&root) = self.index.get(target) else {
            debug!(package = target, "target not in graph, nothing to build first");
            return Vec::new();
        };

        let mut visited = vec![false; self.nodes.len()];
        let mut on_stack = vec![false; self.nodes.len()];
        let mut order = Vec::new();
        // (node, index into its depends_on list)
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        visited[root] = true;
        on_stack[root] = true;

        while let Some(frame) = stack.last_mut() {
            let (pos, next) = *frame;
            match self.nodes[pos].depends_on.get(next) {
                Some(dep) => {
                    frame.1 += 1;
                    let Some(&dep_pos) = self.index.get(dep) else {
                        continue;
                    };
                    if on_stack[dep_pos] {
                        warn!(
                            root = target,
                            package = %self.nodes[pos].name,
                            dependency = %dep,
                            "cycle reachable from build target, order is partial"
                        );
                    }
                    if !visited[dep_pos] {
                        visited[dep_pos] = true;
                        on_stack[dep_pos] = true;
                        stack.push((dep_pos, 0));
                    }
                }
                None => {
                    stack.pop();
                    on_stack[pos] = false;
                    if pos != root {
                        order.push(&self.nodes[pos]);
                    }
                }
            }
        }

        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, deps: &[&str]) -> PackageNode {
        PackageNode::new(name, format!("packages/{name}")).with_dependencies(deps.iter().copied())
    }

    fn names(nodes: &[&PackageNode]) -> Vec<String> {
        nodes.iter().map(|n| n.name.clone()).collect()
    }

    fn sample() -> DependencyGraph {
        DependencyGraph::new([node("a", &[]), node("b", &["a"]), node("c", &["a", "b"])])
    }

    #[test]
    fn test_topological_order() {
        let graph = sample();
        assert_eq!(names(&graph.topological_sort().unwrap()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_order_independent_of_input_order() {
        let graph =
            DependencyGraph::new([node("c", &["a", "b"]), node("b", &["a"]), node("a", &[])]);
        assert_eq!(names(&graph.topological_sort().unwrap()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_ties_follow_input_order() {
        let graph = DependencyGraph::new([
            node("zeta", &[]),
            node("alpha", &[]),
            node("app", &["zeta", "alpha"]),
            node("mid", &[]),
        ]);
        assert_eq!(
            names(&graph.topological_sort().unwrap()),
            vec!["zeta", "alpha", "mid", "app"]
        );
    }

    #[test]
    fn test_every_node_after_its_dependencies() {
        let graph = DependencyGraph::new([
            node("cli", &["core", "utils", "config"]),
            node("utils", &["core"]),
            node("config", &["utils"]),
            node("core", &[]),
            node("docs", &[]),
        ]);
        let sorted = graph.topological_sort().unwrap();
        assert_eq!(sorted.len(), graph.len());

        let position = |name: &str| sorted.iter().position(|n| n.name == name).unwrap();
        for n in graph.nodes() {
            for dep in &n.depends_on {
                assert!(position(dep) < position(&n.name), "{dep} before {}", n.name);
            }
        }
    }

    #[test]
    fn test_external_dependencies_do_not_block() {
        let graph = DependencyGraph::new([node("a", &["react"]), node("b", &["a", "lodash"])]);
        assert_eq!(names(&graph.topological_sort().unwrap()), vec!["a", "b"]);
        assert_eq!(graph.external_dependencies("b"), vec!["lodash"]);
        assert_eq!(names(&graph.dependency_order("b")), vec!["a"]);
    }

    #[test]
    fn test_two_node_cycle() {
        let graph = DependencyGraph::new([node("a", &["b"]), node("b", &["a"])]);
        let err = graph.topological_sort().unwrap_err();
        match err {
            GraphError::Cycle { cycle } => assert_eq!(cycle, vec!["a", "b", "a"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cycle_reported_without_downstream_nodes() {
        let graph = DependencyGraph::new([
            node("app", &["x"]),
            node("x", &["y"]),
            node("y", &["z"]),
            node("z", &["x"]),
            node("ok", &[]),
        ]);
        match graph.topological_sort() {
            Err(GraphError::Cycle { cycle }) => assert_eq!(cycle, vec!["x", "y", "z", "x"]),
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let graph = DependencyGraph::new([node("a", &["a"])]);
        assert!(matches!(
            graph.topological_sort(),
            Err(GraphError::Cycle { .. })
        ));
    }

    #[test]
    fn test_dependency_order() {
        let graph = sample();
        assert_eq!(names(&graph.dependency_order("c")), vec!["a", "b"]);
        assert_eq!(names(&graph.dependency_order("b")), vec!["a"]);
        assert!(graph.dependency_order("a").is_empty());
    }

    #[test]
    fn test_dependency_order_unknown_target() {
        assert!(sample().dependency_order("missing").is_empty());
    }

    #[test]
    fn test_dependency_order_only_ancestors() {
        let graph = DependencyGraph::new([
            node("core", &[]),
            node("unrelated", &[]),
            node("utils", &["core"]),
            node("cli", &["utils"]),
        ]);
        assert_eq!(names(&graph.dependency_order("cli")), vec!["core", "utils"]);
    }

    #[test]
    fn test_dependency_order_shared_dependency_once() {
        let graph = DependencyGraph::new([
            node("base", &[]),
            node("left", &["base"]),
            node("right", &["base"]),
            node("top", &["left", "right", "base"]),
        ]);
        assert_eq!(
            names(&graph.dependency_order("top")),
            vec!["base", "left", "right"]
        );
    }

    #[test]
    fn test_dependency_order_terminates_on_cycle() {
        let graph = DependencyGraph::new([node("a", &["b"]), node("b", &["c"]), node("c", &["b"])]);
        assert_eq!(names(&graph.dependency_order("a")), vec!["c", "b"]);

        let back_to_target = DependencyGraph::new([node("a", &["b"]), node("b", &["a"])]);
        assert_eq!(names(&back_to_target.dependency_order("a")), vec!["b"]);
    }

    #[test]
    fn test_duplicate_names_last_wins() {
        let graph = DependencyGraph::new([
            node("a", &[]),
            node("b", &["a"]),
            node("a", &["b"]),
        ]);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.get("a").unwrap().depends_on, vec!["b"]);
        assert!(graph.topological_sort().is_err());
    }

    #[test]
    fn test_repeated_dependency_collapsed() {
        let graph = DependencyGraph::new([node("a", &[]), node("b", &["a", "a"])]);
        assert_eq!(graph.get("b").unwrap().depends_on, vec!["a"]);
        assert_eq!(names(&graph.topological_sort().unwrap()), vec!["a", "b"]);
    }
}
