//! Node/edge projection types exchanged with viewers

use serde::{Deserialize, Serialize};

/// Graph node as rendered by the viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisNode {
    pub id: usize,
    pub label: String,
    pub shape: String,
}

/// Directed edge, one per triple with a non-literal object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisEdge {
    pub id: String,
    pub from: usize,
    pub to: usize,
    pub label: String,
    pub arrows: String,
}

/// Full projection pushed in a `graphData` event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualizationData {
    pub nodes: Vec<VisNode>,
    pub edges: Vec<VisEdge>,
}

impl VisualizationData {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// Node of the (possibly down-sampled) subgraph a viewer sends with a chat message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentNode {
    pub id: usize,
    #[serde(default)]
    pub label: String,
}

/// Edge of the subgraph a viewer sends with a chat message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentEdge {
    pub from: usize,
    pub to: usize,
    #[serde(default)]
    pub label: String,
}

/// Subgraph currently displayed by the viewer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentGraphData {
    #[serde(default)]
    pub nodes: Vec<CurrentNode>,
    #[serde(default)]
    pub edges: Vec<CurrentEdge>,
}

/// Body of `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(rename = "currentGraphData", default)]
    pub current_graph_data: Option<CurrentGraphData>,
}
