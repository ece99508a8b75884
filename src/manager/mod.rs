//! Knowledge graph manager - core data engine
//!
//! Owns the in-memory graph, loads it lazily from a `GraphStore` and
//! persists it after every mutation. Every mutating operation runs
//! read-modify-persist under one write-lock acquisition.

mod crud;
mod io;
pub mod prefixes;
mod query;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::RdfResult;
use crate::format::RdfFormat;
use crate::store::{FileStore, GraphStore, MemoryStore};
use crate::types::{default_prefixes, RdfGraph, Triple, TriplePattern};

pub use prefixes::{expand_iri, shorten_iri, PrefixChange};

/// In-memory graph plus whether it has been read from the store yet
#[derive(Debug, Default)]
pub(crate) struct GraphSlot {
    loaded: bool,
    graph: RdfGraph,
}

/// Single owner of the triple store
pub struct KnowledgeGraphManager {
    store: Box<dyn GraphStore>,
    pub(crate) graph: RwLock<GraphSlot>,
}

impl KnowledgeGraphManager {
    /// Create a manager persisting through the given store
    pub fn new(store: Box<dyn GraphStore>) -> Self {
        info!(store = %store.describe(), "Graph store configured");
        Self {
            store,
            graph: RwLock::new(GraphSlot::default()),
        }
    }

    /// Create a manager without persistence
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore))
    }

    /// Create a manager backed by a file; the syntax follows the extension
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(FileStore::new(path)))
    }

    /// Make sure the slot holds the stored graph, loading it on first use.
    ///
    /// A failed load leaves the slot unloaded so the next call retries.
    pub(crate) fn ensure_loaded<'a>(&self, slot: &'a mut GraphSlot) -> RdfResult<&'a mut RdfGraph> {
        if !slot.loaded {
            if let Some(stored) = self.store.load()? {
                slot.graph = with_default_prefixes(stored);
            }
            slot.loaded = true;
            debug!(triples = slot.graph.len(), "Graph loaded");
        }
        Ok(&mut slot.graph)
    }

    /// Clone the current graph
    pub(crate) fn snapshot(&self) -> RdfResult<RdfGraph> {
        {
            let slot = self.graph.read();
            if slot.loaded {
                return Ok(slot.graph.clone());
            }
        }

        let mut slot = self.graph.write();
        Ok(self.ensure_loaded(&mut slot)?.clone())
    }

    /// Persist `next` and install it; on failure the slot is untouched
    pub(crate) fn commit(&self, slot: &mut GraphSlot, next: RdfGraph) -> RdfResult<()> {
        self.store.save(&next)?;
        slot.graph = next;
        slot.loaded = true;
        Ok(())
    }

    /// Apply a synchronous mutation to a working copy, persist it, then
    /// install it
    pub fn update_graph<F, R>(&self, mutate: F) -> RdfResult<R>
    where
        F: FnOnce(&mut RdfGraph) -> R,
    {
        let mut slot = self.graph.write();
        let mut next = self.ensure_loaded(&mut slot)?.clone();
        let result = mutate(&mut next);
        self.commit(&mut slot, next)?;
        Ok(result)
    }
}

/// Keep the seeded vocabularies available on top of a stored prefix table
pub(crate) fn with_default_prefixes(mut graph: RdfGraph) -> RdfGraph {
    let mut prefixes = default_prefixes();
    prefixes.append(&mut graph.prefixes);
    graph.prefixes = prefixes;
    graph
}

/// Run manager work on tokio's blocking pool.
///
/// Mutations hold the graph lock across the store's file I/O, so async
/// handlers call them through here instead of on a runtime worker.
pub async fn blocking<T, F>(work: F) -> RdfResult<T>
where
    F: FnOnce() -> RdfResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

// Operations implemented in submodules
impl KnowledgeGraphManager {
    // CRUD operations (from crud.rs)
    pub fn add_triples(&self, triples: Vec<Triple>) -> RdfResult<Vec<Triple>> {
        crud::add_triples(self, triples)
    }

    pub fn remove_triples(&self, patterns: &[TriplePattern]) -> RdfResult<usize> {
        crud::remove_triples(self, patterns)
    }

    pub fn delete_triples(&self, patterns: &[TriplePattern]) -> RdfResult<usize> {
        crud::remove_triples(self, patterns)
    }

    pub fn replace_graph(&self, graph: RdfGraph) -> RdfResult<usize> {
        crud::replace_graph(self, graph)
    }

    pub fn clear(&self) -> RdfResult<usize> {
        crud::clear(self)
    }

    // Query operations (from query.rs)
    pub fn read_graph(&self) -> RdfResult<RdfGraph> {
        query::read_graph(self)
    }

    pub fn query_triples(&self, pattern: &TriplePattern) -> RdfResult<Vec<Triple>> {
        query::query_triples(self, pattern)
    }

    pub fn triple_count(&self) -> RdfResult<usize> {
        query::triple_count(self)
    }

    // Prefix operations (from prefixes.rs)
    pub fn add_prefix(&self, prefix: &str, uri: &str) -> RdfResult<PrefixChange> {
        prefixes::add_prefix(self, prefix, uri)
    }

    pub fn delete_prefix(&self, prefix: &str) -> RdfResult<bool> {
        prefixes::delete_prefix(self, prefix)
    }

    pub fn prefixes(&self) -> RdfResult<BTreeMap<String, String>> {
        prefixes::prefixes(self)
    }

    pub fn display_graph(&self) -> RdfResult<RdfGraph> {
        prefixes::display_graph(self)
    }

    // Export and file operations (from io.rs)
    pub fn export(&self, format: RdfFormat) -> RdfResult<String> {
        io::export(self, format)
    }

    pub fn export_as_ntriples(&self) -> RdfResult<String> {
        io::export(self, RdfFormat::NTriples)
    }

    pub fn save_as(&self, path: &Path, format: RdfFormat) -> RdfResult<PathBuf> {
        io::save_as(self, path, format)
    }

    pub fn load_file(&self, path: &Path) -> RdfResult<usize> {
        io::load_file(self, path)
    }
}

impl Default for KnowledgeGraphManager {
    fn default() -> Self {
        Self::in_memory()
    }
}
