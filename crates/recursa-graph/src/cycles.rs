//! Cycle detection over a call graph.
//!
//! A vertex is recursive when it belongs to a strongly connected component
//! with more than one member, or to a singleton component with a self-loop.
//! Components come from petgraph's Kosaraju implementation, which is
//! iterative and linear in vertices plus edges.

use crate::graph::CallGraph;
use petgraph::algo::kosaraju_scc;
use recursa_core::VertexKey;
use serde::Serialize;
use std::collections::BTreeSet;

/// Vertices that participate in at least one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleSet {
    members: BTreeSet<VertexKey>,
    /// One sorted entry per recursive component, sorted.
    components: Vec<Vec<VertexKey>>,
}

impl CycleSet {
    /// True when the analyzed graph is acyclic.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of recursive vertices.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, key: &VertexKey) -> bool {
        self.members.contains(key)
    }

    /// Iterates over recursive vertices in key order.
    pub fn iter(&self) -> impl Iterator<Item = &VertexKey> {
        self.members.iter()
    }

    pub fn members(&self) -> &BTreeSet<VertexKey> {
        &self.members
    }

    /// Recursive components, each a set of mutually recursive methods.
    pub fn components(&self) -> &[Vec<VertexKey>] {
        &self.components
    }

    pub fn into_members(self) -> BTreeSet<VertexKey> {
        self.members
    }
}

impl CallGraph {
    /// Finds every vertex that lies on a cycle.
    pub fn find_cycles(&self) -> CycleSet {
        let mut components: Vec<Vec<VertexKey>> = kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut keys: Vec<VertexKey> =
                    scc.into_iter().map(|id| self.graph[id].clone()).collect();
                keys.sort();
                keys
            })
            .collect();
        components.sort();

        let members = components.iter().flatten().cloned().collect();
        CycleSet {
            members,
            components,
        }
    }

    /// Returns true if any cycle exists.
    pub fn has_cycle(&self) -> bool {
        !self.find_cycles().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::CallEdge;

    fn key(owner: &str, name: &str) -> VertexKey {
        VertexKey::new(owner, name, Vec::<String>::new())
    }

    #[test]
    fn test_empty_graph() {
        let cycles = CallGraph::new().find_cycles();
        assert!(cycles.is_empty());
        assert!(cycles.components().is_empty());
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let mut graph = CallGraph::new();
        graph.add_edge(key("A", "f"), key("A", "f"), CallEdge::calls());

        let cycles = graph.find_cycles();
        assert_eq!(cycles.len(), 1);
        assert!(cycles.contains(&key("A", "f")));
        assert_eq!(cycles.components(), [vec![key("A", "f")]]);
    }

    #[test]
    fn test_singleton_without_loop_is_not() {
        let mut graph = CallGraph::new();
        graph.add_vertex(key("A", "f"));
        graph.add_edge(key("A", "g"), key("A", "h"), CallEdge::calls());
        assert!(!graph.has_cycle());
    }

    #[test]
    fn test_separate_components_are_grouped() {
        let mut graph = CallGraph::new();
        graph.add_edge(key("X", "a"), key("X", "b"), CallEdge::calls());
        graph.add_edge(key("X", "b"), key("X", "a"), CallEdge::calls());
        graph.add_edge(key("Y", "c"), key("Y", "c"), CallEdge::calls());
        graph.add_edge(key("X", "b"), key("Y", "c"), CallEdge::calls());

        let cycles = graph.find_cycles();
        assert_eq!(cycles.len(), 3);
        assert_eq!(
            cycles.components(),
            [
                vec![key("X", "a"), key("X", "b")],
                vec![key("Y", "c")],
            ]
        );
    }

    #[test]
    fn test_tail_leading_into_cycle_is_excluded() {
        // entry → a → b → c → a
        let mut graph = CallGraph::new();
        graph.add_edge(key("M", "entry"), key("M", "a"), CallEdge::calls());
        graph.add_edge(key("M", "a"), key("M", "b"), CallEdge::calls());
        graph.add_edge(key("M", "b"), key("M", "c"), CallEdge::calls());
        graph.add_edge(key("M", "c"), key("M", "a"), CallEdge::calls());

        let cycles = graph.find_cycles();
        let names: Vec<&str> = cycles.iter().map(|k| k.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let mut graph = CallGraph::new();
        let depth = 50_000;
        for i in 0..depth {
            graph.add_edge(
                key("Deep", &format!("m{i}")),
                key("Deep", &format!("m{}", i + 1)),
                CallEdge::calls(),
            );
        }
        assert!(!graph.has_cycle());

        graph.add_edge(
            key("Deep", &format!("m{depth}")),
            key("Deep", "m0"),
            CallEdge::calls(),
        );
        assert_eq!(graph.find_cycles().len(), depth + 1);
    }
}
