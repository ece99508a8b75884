//! Data types for the RDF graph server
//!
//! This module contains the triple model, the graph container and the
//! projection records exchanged with viewers.

mod graph;
mod triple;
mod visualization;

pub use graph::{default_prefixes, PrefixTable, RdfGraph};
pub use triple::{is_blank_node, is_iri, Triple, TriplePattern};
pub use visualization::{
    ChatRequest, CurrentEdge, CurrentGraphData, CurrentNode, VisEdge, VisNode, VisualizationData,
};

/// Check if value is false (for skip_serializing_if)
pub fn is_false(val: &bool) -> bool {
    !*val
}
