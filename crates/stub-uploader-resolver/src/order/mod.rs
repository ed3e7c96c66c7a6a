//! Publication order for a set of stub distributions
//!
//! Builds the stub-to-stub dependency graph of the requested distributions
//! with petgraph and emits them by repeated selection: each step emits the
//! earliest requested distribution whose in-set dependencies have all been
//! emitted. Input order is the tie-break, so the same request always yields
//! the same plan and an already valid order comes back unchanged.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use tracing::debug;

use stub_uploader_core::error::StubError;
use stub_uploader_core::provider::{KnownStubs, MetadataStore};
use stub_uploader_core::types::{canonical_name, strip_types_prefix};

use crate::rules::verify_typeshed_req;
use crate::verify::Verifier;
use crate::ResolverResult;


/// Dependency graph over a requested set of distributions. An edge runs
/// from a dependent to the dependency it needs published first.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Underlying directed graph; node weights are distribution names
    graph: DiGraph<String, ()>,
    /// Map from canonical name to NodeIndex for fast lookups
    node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a distribution; adding a name twice returns the existing node
    pub fn add_package(&mut self, name: &str) -> NodeIndex {
        let key = canonical_name(name);
        if let Some(existing) = self.node_map.get(&key) {
            return *existing;
        }
        let index = self.graph.add_node(name.to_string());
        self.node_map.insert(key, index);
        index
    }

    /// Record that `dependent` needs `dependency` published first. Returns
    /// `false`, adding nothing, when either side is outside the graph.
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) -> bool {
        let (Some(from), Some(to)) = (self.index_of(dependent), self.index_of(dependency)) else {
            return false;
        };
        if !self.graph.contains_edge(from, to) {
            self.graph.add_edge(from, to, ());
        }
        true
    }

    /// Whether `name` is part of the graph
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Dependencies of `name` that are inside the graph
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        self.index_of(name)
            .map(|index| {
                self.graph
                    .neighbors_directed(index, Direction::Outgoing)
                    .map(|dep| self.graph[dep].as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get number of distributions in the graph
    pub fn package_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get number of dependency edges in the graph
    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Emit every distribution after its in-graph dependencies, preferring
    /// insertion order among those ready
    pub fn publish_order(&self) -> ResolverResult<Vec<String>> {
        let count = self.graph.node_count();
        let mut emitted = vec![false; count];
        let mut order = Vec::with_capacity(count);

        while order.len() < count {
            let ready = self.graph.node_indices().find(|&index| {
                !emitted[index.index()]
                    && self
                        .graph
                        .neighbors_directed(index, Direction::Outgoing)
                        .all(|dep| emitted[dep.index()])
            });

            let Some(index) = ready else {
                let cycle = self.find_cycle(&emitted);
                return Err(StubError::CircularDependency {
                    cycle: Self::format_cycle(&cycle),
                });
            };

            debug!("Emitting {}", self.graph[index]);
            emitted[index.index()] = true;
            order.push(self.graph[index].clone());
        }

        Ok(order)
    }

    /// Check for cycles and return the first one found, in dependency order
    pub fn detect_cycle(&self) -> Option<Vec<String>> {
        let cycle = self.find_cycle(&vec![false; self.graph.node_count()]);
        (!cycle.is_empty()).then_some(cycle)
    }

    /// Format a closed cycle as "a -> b -> a"
    pub fn format_cycle(cycle: &[String]) -> String {
        if cycle.is_empty() {
            return "No cycle".to_string();
        }
        cycle.join(" -> ")
    }

    /// A closed cycle among the nodes not yet emitted, starting at the
    /// earliest inserted member; empty when there is none
    fn find_cycle(&self, emitted: &[bool]) -> Vec<String> {
        let component = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| !emitted[scc[0].index()])
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .min_by_key(|scc| scc.iter().map(|index| index.index()).min());

        let Some(component) = component else {
            return Vec::new();
        };

        let members: HashSet<NodeIndex> = component.iter().copied().collect();
        let mut current = component.iter().copied().min().unwrap_or(component[0]);
        let mut path: Vec<NodeIndex> = Vec::new();

        // Every member of a cyclic component has a successor inside it
        loop {
            if let Some(start) = path.iter().position(|&seen| seen == current) {
                let mut cycle: Vec<String> =
                    path[start..].iter().map(|&index| self.graph[index].clone()).collect();
                cycle.push(self.graph[current].clone());
                return cycle;
            }
            path.push(current);

            let next = self
                .graph
                .neighbors_directed(current, Direction::Outgoing)
                .filter(|dep| members.contains(dep))
                .min_by_key(|dep| dep.index());
            match next {
                Some(dep) => current = dep,
                None => return Vec::new(),
            }
        }
    }

    fn index_of(&self, name: &str) -> Option<NodeIndex> {
        self.node_map.get(&canonical_name(name)).copied()
    }
}

/// Order `distributions` so that each comes after every distribution of the
/// request whose stubs it requires. Duplicates are dropped (first spelling
/// wins); dependencies outside the request are assumed published already.
pub fn sort_by_dependency<S: AsRef<str>>(
    store: &dyn MetadataStore,
    known: &dyn KnownStubs,
    distributions: &[S],
) -> ResolverResult<Vec<String>> {
    let mut requested: IndexMap<String, String> = IndexMap::new();
    for name in distributions {
        let name = name.as_ref();
        requested
            .entry(canonical_name(name))
            .or_insert_with(|| name.to_string());
    }

    let mut graph = DependencyGraph::new();
    for name in requested.values() {
        graph.add_package(name);
    }

    for name in requested.values() {
        let metadata = store.load(name)?;
        for req in metadata.unvalidated_requires_typeshed(known) {
            verify_typeshed_req(req, known)?;
            if let Some(dependency) = strip_types_prefix(req.name()) {
                if graph.add_dependency(name, dependency) {
                    debug!("{} must follow {}", name, dependency);
                }
            }
        }
    }

    graph.publish_order()
}

impl Verifier<'_> {
    /// Publication order for `distributions` over this verifier's corpus
    pub fn sort_by_dependency<S: AsRef<str>>(&self, distributions: &[S]) -> ResolverResult<Vec<String>> {
        sort_by_dependency(self.store, self.known, distributions)
    }
}
