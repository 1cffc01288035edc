//! Module Graph - which stores a compilation can see.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: module names
//! - Edges: `DependsOn` from a module to each module it depends on, in
//!   declaration order

use std::collections::VecDeque;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};

/// Dependency edges between modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleEdge {
    DependsOn,
}

/// The module dependency graph.
///
/// The current module's store is loaded first and each dependency after it,
/// breadth-first in declaration order. Merging is first-wins, so the current
/// module shadows its dependencies and nearer dependencies shadow farther ones.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    graph: DiGraph<String, ModuleEdge>,
    index: FxHashMap<String, NodeIndex>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the node for `module`.
    pub fn add_module(&mut self, module: &str) -> NodeIndex {
        if let Some(&node) = self.index.get(module) {
            return node;
        }
        let node = self.graph.add_node(module.to_string());
        self.index.insert(module.to_string(), node);
        node
    }

    /// Record that `module` depends on `dependency`.
    ///
    /// Declaring the same dependency twice is a no-op.
    pub fn add_dependency(&mut self, module: &str, dependency: &str) {
        let from = self.add_module(module);
        let to = self.add_module(dependency);
        if self.graph.find_edge(from, to).is_none() {
            self.graph.add_edge(from, to, ModuleEdge::DependsOn);
        }
    }

    pub fn contains(&self, module: &str) -> bool {
        self.index.contains_key(module)
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Direct dependencies of `module` in declaration order.
    pub fn dependencies(&self, module: &str) -> Vec<&str> {
        match self.index.get(module) {
            Some(&node) => self
                .ordered_targets(node)
                .into_iter()
                .map(|target| self.graph[target].as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    /// `module` followed by every module reachable from it, breadth-first.
    ///
    /// Each module appears once even when reachable along several paths, and
    /// dependency cycles terminate.
    pub fn load_order(&self, module: &str) -> Vec<String> {
        let Some(&start) = self.index.get(module) else {
            return vec![module.to_string()];
        };

        let mut order = Vec::new();
        let mut visited = FxHashSet::default();
        let mut queue = VecDeque::from([start]);
        visited.insert(start);

        while let Some(node) = queue.pop_front() {
            order.push(self.graph[node].clone());
            for target in self.ordered_targets(node) {
                if visited.insert(target) {
                    queue.push_back(target);
                }
            }
        }
        order
    }

    // petgraph yields outgoing edges newest first.
    fn ordered_targets(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self
            .graph
            .edges(node)
            .map(|edge| (edge.id(), edge.target()))
            .collect();
        edges.sort_by_key(|(id, _)| *id);
        edges.into_iter().map(|(_, target)| target).collect()
    }
}
