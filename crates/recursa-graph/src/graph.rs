//! Core graph data structure.
//!
//! The CallGraph wraps petgraph and adds a key index so vertices are
//! unique by [`VertexKey`] and edges are unique by (caller, callee).

use crate::builder::SkippedCall;
use crate::edge::{CallEdge, EdgeKind};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use recursa_core::VertexKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Index of a vertex inside one graph instance.
pub type VertexId = NodeIndex;

/// Directed call graph over canonical method identities.
///
/// Built once per analysis and read-only afterwards. Extraction produces a
/// new instance; nothing is ever removed from a graph.
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    /// The underlying petgraph graph.
    pub(crate) graph: DiGraph<VertexKey, CallEdge>,

    /// Maps keys to graph indexes.
    index: HashMap<VertexKey, VertexId>,

    /// Calls the resolver could not resolve, by caller.
    pub(crate) unresolved: Vec<SkippedCall>,
}

impl CallGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex, returning the existing index if the key is known.
    pub fn add_vertex(&mut self, key: VertexKey) -> VertexId {
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = self.graph.add_node(key.clone());
        self.index.insert(key, id);
        id
    }

    /// Adds an edge, registering both endpoints.
    ///
    /// Returns `false` if the edge already existed.
    pub fn add_edge(&mut self, from: VertexKey, to: VertexKey, edge: CallEdge) -> bool {
        let from = self.add_vertex(from);
        let to = self.add_vertex(to);
        self.add_edge_between(from, to, edge)
    }

    pub(crate) fn add_edge_between(&mut self, from: VertexId, to: VertexId, edge: CallEdge) -> bool {
        if self.graph.find_edge(from, to).is_some() {
            return false;
        }
        self.graph.add_edge(from, to, edge);
        true
    }

    pub(crate) fn record_unresolved(&mut self, call: SkippedCall) {
        self.unresolved.push(call);
    }

    /// Returns true if the key is a vertex of this graph.
    pub fn contains(&self, key: &VertexKey) -> bool {
        self.index.contains_key(key)
    }

    /// Gets the index of a key.
    pub fn index_of(&self, key: &VertexKey) -> Option<VertexId> {
        self.index.get(key).copied()
    }

    /// Gets a key by its index.
    pub fn get(&self, id: VertexId) -> Option<&VertexKey> {
        self.graph.node_weight(id)
    }

    /// Returns true if `from` has an edge to `to`.
    pub fn has_edge(&self, from: &VertexKey, to: &VertexKey) -> bool {
        match (self.index_of(from), self.index_of(to)) {
            (Some(from), Some(to)) => self.graph.contains_edge(from, to),
            _ => false,
        }
    }

    /// Returns the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterates over all vertices.
    pub fn vertices(&self) -> impl Iterator<Item = &VertexKey> {
        self.graph.node_weights()
    }

    /// Iterates over all edges as (caller, callee, edge).
    pub fn edges(&self) -> impl Iterator<Item = (&VertexKey, &VertexKey, &CallEdge)> + '_ {
        self.graph.edge_references().map(|edge_ref| {
            (
                &self.graph[edge_ref.source()],
                &self.graph[edge_ref.target()],
                edge_ref.weight(),
            )
        })
    }

    /// Gets the vertices this key calls or dispatches to.
    pub fn callees(&self, key: &VertexKey) -> Vec<&VertexKey> {
        self.neighbors(key, Direction::Outgoing)
    }

    /// Gets the vertices that call or dispatch to this key.
    pub fn callers(&self, key: &VertexKey) -> Vec<&VertexKey> {
        self.neighbors(key, Direction::Incoming)
    }

    fn neighbors(&self, key: &VertexKey, direction: Direction) -> Vec<&VertexKey> {
        let Some(id) = self.index_of(key) else {
            return Vec::new();
        };
        let mut keys: Vec<&VertexKey> = self
            .graph
            .neighbors_directed(id, direction)
            .filter_map(|n| self.graph.node_weight(n))
            .collect();
        keys.sort();
        keys
    }

    /// Vertex set for order-independent comparison.
    pub fn vertex_set(&self) -> BTreeSet<VertexKey> {
        self.vertices().cloned().collect()
    }

    /// Edge set (caller, callee) for order-independent comparison.
    pub fn edge_set(&self) -> BTreeSet<(VertexKey, VertexKey)> {
        self.edges()
            .map(|(from, to, _)| (from.clone(), to.clone()))
            .collect()
    }

    /// Calls that were skipped because the resolver could not resolve them.
    pub fn unresolved_calls(&self) -> &[SkippedCall] {
        &self.unresolved
    }
}

/// Graph statistics for the status command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub vertex_count: usize,
    pub edge_count: usize,
    pub dispatch_edges: usize,
    pub self_loops: usize,
    pub unresolved_calls: usize,
}

impl CallGraph {
    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        let mut dispatch_edges = 0;
        let mut self_loops = 0;
        for edge_ref in self.graph.edge_references() {
            if edge_ref.weight().kind == EdgeKind::Dispatches {
                dispatch_edges += 1;
            }
            if edge_ref.source() == edge_ref.target() {
                self_loops += 1;
            }
        }

        GraphStats {
            vertex_count: self.vertex_count(),
            edge_count: self.edge_count(),
            dispatch_edges,
            self_loops,
            unresolved_calls: self.unresolved.len(),
        }
    }
}
