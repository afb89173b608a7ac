//! Graph export to Graphviz DOT and JSON.

use crate::builder::SkippedCall;
use crate::cycles::CycleSet;
use crate::edge::{CallEdge, EdgeKind, GraphEdge};
use crate::error::Result;
use crate::graph::{CallGraph, GraphStats, VertexId};
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, EdgeReference};
use petgraph::visit::EdgeRef;
use recursa_core::VertexKey;
use serde::Serialize;

/// Serializable snapshot of a call graph.
#[derive(Debug, Serialize)]
pub struct GraphExport {
    pub stats: GraphStats,
    pub vertices: Vec<String>,
    pub edges: Vec<GraphEdge>,
    pub unresolved: Vec<SkippedCall>,
}

impl CallGraph {
    /// Returns all edges with display-form endpoints.
    pub fn export_edges(&self) -> Vec<GraphEdge> {
        let mut edges: Vec<GraphEdge> = self
            .edges()
            .map(|(source, target, edge)| GraphEdge {
                source: source.to_string(),
                target: target.to_string(),
                kind: edge.kind,
            })
            .collect();
        edges.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));
        edges
    }

    /// Builds a sorted export snapshot.
    pub fn to_export(&self) -> GraphExport {
        let mut vertices: Vec<String> = self.vertices().map(ToString::to_string).collect();
        vertices.sort();

        GraphExport {
            stats: self.stats(),
            vertices,
            edges: self.export_edges(),
            unresolved: self.unresolved.clone(),
        }
    }

    /// Renders the export snapshot as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_export())?)
    }

    /// Renders the graph as DOT.
    pub fn to_dot(&self) -> String {
        self.render_dot(None)
    }

    /// Renders the graph as DOT with cycle members drawn in red.
    pub fn to_dot_highlighting(&self, cycles: &CycleSet) -> String {
        self.render_dot(Some(cycles))
    }

    fn render_dot(&self, cycles: Option<&CycleSet>) -> String {
        let in_cycle = |key: &VertexKey| cycles.map_or(false, |c| c.contains(key));

        let node_attrs = |_: &DiGraph<VertexKey, CallEdge>, (_, key): (VertexId, &VertexKey)| {
            if in_cycle(key) {
                "color = red fontcolor = red ".to_string()
            } else {
                String::new()
            }
        };
        let edge_attrs = |g: &DiGraph<VertexKey, CallEdge>, edge: EdgeReference<'_, CallEdge>| {
            let mut attrs = String::new();
            if edge.weight().kind == EdgeKind::Dispatches {
                attrs.push_str("style = dashed ");
            }
            if in_cycle(&g[edge.source()]) && in_cycle(&g[edge.target()]) {
                attrs.push_str("color = red ");
            }
            attrs
        };

        format!(
            "{}",
            Dot::with_attr_getters(
                &self.graph,
                &[Config::EdgeNoLabel],
                &edge_attrs,
                &node_attrs
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> VertexKey {
        VertexKey::new("A", name, ["int"])
    }

    fn sample() -> CallGraph {
        let mut graph = CallGraph::new();
        graph.add_edge(key("f"), key("g"), CallEdge::calls());
        graph.add_edge(key("g"), key("f"), CallEdge::calls());
        graph.add_edge(key("g"), key("h"), CallEdge::dispatches());
        graph
    }

    #[test]
    fn test_dot_labels_every_vertex() {
        let dot = sample().to_dot();
        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("label = \"A.f(int)\""));
        assert!(dot.contains("label = \"A.h(int)\""));
        assert!(dot.contains("style = dashed"));
        assert!(!dot.contains("color = red"));
    }

    #[test]
    fn test_dot_highlights_cycles() {
        let graph = sample();
        let dot = graph.to_dot_highlighting(&graph.find_cycles());
        assert_eq!(dot.matches("fontcolor = red").count(), 2);
        let red_edges = dot
            .lines()
            .filter(|line| line.contains("->") && line.contains("color = red"))
            .count();
        assert_eq!(red_edges, 2);
    }

    #[test]
    fn test_json_export() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["stats"]["vertex_count"], 3);
        assert_eq!(value["stats"]["dispatch_edges"], 1);
        assert_eq!(value["vertices"][0], "A.f(int)");
        assert_eq!(value["edges"][0]["source"], "A.f(int)");
        assert_eq!(value["edges"][0]["kind"], "calls");
        assert_eq!(value["edges"].as_array().unwrap().len(), 3);
    }
}
