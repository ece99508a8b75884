//! Query operations for the triple store
//!
//! Linear scans; graphs above `PARALLEL_SCAN_THRESHOLD` triples are filtered
//! with rayon. Results keep graph order either way.

use rayon::prelude::*;

use crate::error::RdfResult;
use crate::types::{RdfGraph, Triple, TriplePattern};

use super::prefixes::expand_pattern;
use super::KnowledgeGraphManager;

/// Threshold for using a parallel scan (triple count)
const PARALLEL_SCAN_THRESHOLD: usize = 1000;

/// Snapshot of the whole graph
pub fn read_graph(manager: &KnowledgeGraphManager) -> RdfResult<RdfGraph> {
    manager.snapshot()
}

/// Triples matching a pattern whose prefixed fields are expanded first
pub fn query_triples(manager: &KnowledgeGraphManager, pattern: &TriplePattern) -> RdfResult<Vec<Triple>> {
    let mut slot = manager.graph.write();
    let graph = manager.ensure_loaded(&mut slot)?;
    let pattern = expand_pattern(&graph.prefixes, pattern.clone());

    if pattern.is_empty() {
        return Ok(graph.triples.clone());
    }

    let matches = if graph.len() > PARALLEL_SCAN_THRESHOLD {
        graph
            .triples
            .par_iter()
            .filter(|t| pattern.matches(t))
            .cloned()
            .collect()
    } else {
        graph
            .triples
            .iter()
            .filter(|t| pattern.matches(t))
            .cloned()
            .collect()
    };

    Ok(matches)
}

/// Number of stored triples
pub fn triple_count(manager: &KnowledgeGraphManager) -> RdfResult<usize> {
    {
        let slot = manager.graph.read();
        if slot.loaded {
            return Ok(slot.graph.len());
        }
    }
    Ok(manager.snapshot()?.len())
}
