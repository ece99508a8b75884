//! JSON graph documents

use crate::error::RdfResult;
use crate::types::RdfGraph;

pub(super) fn decode(input: &str) -> RdfResult<RdfGraph> {
    if input.trim().is_empty() {
        return Ok(RdfGraph::new());
    }
    Ok(serde_json::from_str(input)?)
}

pub(super) fn encode(graph: &RdfGraph) -> RdfResult<String> {
    Ok(serde_json::to_string_pretty(graph)?)
}
