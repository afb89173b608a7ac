//! Reachability-scoped subgraphs.
//!
//! Restricting the graph to what an entry point can reach before looking
//! for cycles keeps unrelated recursion elsewhere in the submission out of
//! the verdict.

use crate::error::{GraphError, Result};
use crate::graph::{CallGraph, VertexId};
use petgraph::visit::{Dfs, EdgeRef};
use recursa_core::VertexKey;
use std::collections::HashSet;
use tracing::debug;

impl CallGraph {
    /// Extracts the subgraph induced by everything reachable from `start`.
    ///
    /// The start vertex is always present. Edges are kept when both
    /// endpoints are reachable. Unresolved calls are kept when their caller
    /// is reachable. The input graph is not modified.
    pub fn extract_subgraph(&self, start: &VertexKey) -> Result<CallGraph> {
        let start_id = self
            .index_of(start)
            .ok_or_else(|| GraphError::UnknownVertex(start.clone()))?;
        let reachable = self.reachable_ids(start_id);

        let mut subgraph = CallGraph::new();
        for id in self.graph.node_indices().filter(|id| reachable.contains(id)) {
            subgraph.add_vertex(self.graph[id].clone());
        }
        for edge_ref in self.graph.edge_references() {
            if reachable.contains(&edge_ref.source()) && reachable.contains(&edge_ref.target()) {
                subgraph.add_edge(
                    self.graph[edge_ref.source()].clone(),
                    self.graph[edge_ref.target()].clone(),
                    edge_ref.weight().clone(),
                );
            }
        }
        subgraph.unresolved = self
            .unresolved
            .iter()
            .filter(|call| subgraph.contains(&call.caller))
            .cloned()
            .collect();

        debug!(
            "Extracted subgraph from {}: {} of {} vertices",
            start,
            subgraph.vertex_count(),
            self.vertex_count()
        );
        Ok(subgraph)
    }

    /// Returns every vertex reachable from `start`, including `start`.
    pub fn reachable_from(&self, start: &VertexKey) -> Result<Vec<&VertexKey>> {
        let start_id = self
            .index_of(start)
            .ok_or_else(|| GraphError::UnknownVertex(start.clone()))?;
        let mut keys: Vec<&VertexKey> = self
            .reachable_ids(start_id)
            .into_iter()
            .map(|id| &self.graph[id])
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Iterative DFS, so deep call chains cannot overflow the stack.
    fn reachable_ids(&self, start: VertexId) -> HashSet<VertexId> {
        let mut reachable = HashSet::new();
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(id) = dfs.next(&self.graph) {
            reachable.insert(id);
        }
        reachable
    }
}
