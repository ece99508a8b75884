//! CRUD operations for the triple store

use std::collections::HashSet;

use tracing::debug;

use crate::error::RdfResult;
use crate::types::{RdfGraph, Triple, TriplePattern};

use super::prefixes::{expand_pattern, expand_triple};
use super::{with_default_prefixes, KnowledgeGraphManager};

/// Add triples that are not stored yet (holds the write lock throughout)
pub fn add_triples(manager: &KnowledgeGraphManager, triples: Vec<Triple>) -> RdfResult<Vec<Triple>> {
    let mut slot = manager.graph.write();

    let (next, added) = {
        let current = manager.ensure_loaded(&mut slot)?;

        let mut incoming = Vec::with_capacity(triples.len());
        for triple in triples {
            let triple = expand_triple(&current.prefixes, triple.normalized());
            triple.validate()?;
            incoming.push(triple);
        }

        let mut seen: HashSet<&Triple> = current.triples.iter().collect();
        let added: Vec<Triple> = incoming
            .iter()
            .filter(|triple| seen.insert(*triple))
            .cloned()
            .collect();

        if added.is_empty() {
            debug!("No new triples to add");
            return Ok(added);
        }

        let mut next = current.clone();
        next.triples.extend(added.iter().cloned());
        (next, added)
    };
    manager.commit(&mut slot, next)?;

    debug!(count = added.len(), "Added triples");
    Ok(added)
}

/// Remove every triple matching any of the patterns
pub fn remove_triples(manager: &KnowledgeGraphManager, patterns: &[TriplePattern]) -> RdfResult<usize> {
    let mut slot = manager.graph.write();
    let current = manager.ensure_loaded(&mut slot)?;

    let patterns: Vec<TriplePattern> = patterns
        .iter()
        .map(|p| expand_pattern(&current.prefixes, p.clone()))
        .collect();

    let mut next = current.clone();
    next.triples.retain(|t| !patterns.iter().any(|p| p.matches(t)));
    let removed = current.len() - next.len();

    if removed > 0 {
        manager.commit(&mut slot, next)?;
        debug!(count = removed, "Removed triples");
    }
    Ok(removed)
}

/// Install a whole graph, e.g. an upload; returns its triple count
pub fn replace_graph(manager: &KnowledgeGraphManager, graph: RdfGraph) -> RdfResult<usize> {
    let mut next = with_default_prefixes(graph);
    let triples = std::mem::take(&mut next.triples);
    for triple in triples {
        let triple = expand_triple(&next.prefixes, triple.normalized());
        triple.validate()?;
        next.triples.push(triple);
    }

    let count = next.len();
    let mut slot = manager.graph.write();
    manager.commit(&mut slot, next)?;

    debug!(count, "Replaced graph");
    Ok(count)
}

/// Drop every triple, keeping the prefix table
pub fn clear(manager: &KnowledgeGraphManager) -> RdfResult<usize> {
    let mut slot = manager.graph.write();
    let current = manager.ensure_loaded(&mut slot)?;

    let removed = current.len();
    let next = RdfGraph {
        triples: Vec::new(),
        prefixes: current.prefixes.clone(),
    };
    manager.commit(&mut slot, next)?;

    debug!(count = removed, "Cleared graph");
    Ok(removed)
}
