//! External graph model marshaled into packed layout buffers.
//!
//! Embedders describe their graph with [`LayoutGraph`]; the supervisor packs
//! it into the flat node/edge buffers the engine consumes and writes computed
//! positions back into it after every batch.

use serde::{Deserialize, Serialize};

/// One node as the embedder sees it. `id` is an opaque handle; buffer indices
/// are an internal concern of the supervisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    /// Radius used by anti-overlap repulsion and collision detection.
    #[serde(default = "default_size")]
    pub size: f32,
    /// Pinned nodes never move, regardless of configuration.
    #[serde(default)]
    pub pinned: bool,
}

impl GraphNode {
    pub fn new(id: u64, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            size: default_size(),
            pinned: false,
        }
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }
}

/// One undirected edge between two node ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: u64,
    pub target: u64,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

impl GraphEdge {
    pub fn new(source: u64, target: u64) -> Self {
        Self {
            source,
            target,
            weight: default_weight(),
        }
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }
}

/// The graph handed to [`Supervisor::new`](crate::Supervisor::new). Node
/// order is preserved; it defines the packing order of the buffers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl LayoutGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: GraphNode) -> &mut Self {
        self.nodes.push(node);
        self
    }

    pub fn add_edge(&mut self, edge: GraphEdge) -> &mut Self {
        self.edges.push(edge);
        self
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

fn default_size() -> f32 {
    1.0
}

fn default_weight() -> f32 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_fill_optional_fields() {
        let node = GraphNode::new(7, 1.0, 2.0);
        assert_eq!(node.size, 1.0);
        assert!(!node.pinned);

        let node = GraphNode::new(7, 1.0, 2.0).with_size(4.0).pinned();
        assert_eq!(node.size, 4.0);
        assert!(node.pinned);

        let edge = GraphEdge::new(1, 2);
        assert_eq!(edge.weight, 1.0);
        assert_eq!(GraphEdge::new(1, 2).with_weight(3.0).weight, 3.0);
    }

    #[test]
    fn json_without_optional_fields_uses_defaults() {
        let node: GraphNode = serde_json::from_str(r#"{"id": 3, "x": 1.0, "y": -2.0}"#).unwrap();
        assert_eq!(node.size, 1.0);
        assert!(!node.pinned);

        let edge: GraphEdge = serde_json::from_str(r#"{"source": 3, "target": 4}"#).unwrap();
        assert_eq!(edge.weight, 1.0);
    }

    #[test]
    fn graph_accumulates_nodes_and_edges() {
        let mut graph = LayoutGraph::new();
        graph
            .add_node(GraphNode::new(1, 0.0, 0.0))
            .add_node(GraphNode::new(2, 5.0, 0.0));
        graph.add_edge(GraphEdge::new(1, 2));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }
}
