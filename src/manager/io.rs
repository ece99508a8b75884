//! Export and file operations

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::RdfResult;
use crate::format::RdfFormat;
use crate::store::{FileStore, GraphStore};

use super::KnowledgeGraphManager;

/// Serialize the current graph
pub fn export(manager: &KnowledgeGraphManager, format: RdfFormat) -> RdfResult<String> {
    let graph = manager.snapshot()?;
    format.encode(&graph)
}

/// Write a snapshot to another file; the backing store is not touched
pub fn save_as(manager: &KnowledgeGraphManager, path: &Path, format: RdfFormat) -> RdfResult<PathBuf> {
    let graph = manager.snapshot()?;
    FileStore::with_format(path, format).save(&graph)?;

    info!(path = %path.display(), format = %format, triples = graph.len(), "Graph saved to file");
    Ok(path.to_path_buf())
}

/// Replace the graph with the contents of a file, decoded by extension
pub fn load_file(manager: &KnowledgeGraphManager, path: &Path) -> RdfResult<usize> {
    let content = fs::read_to_string(path)?;
    let graph = RdfFormat::from_extension(path).decode(&content)?;
    let count = manager.replace_graph(graph)?;

    info!(path = %path.display(), triples = count, "Graph loaded from file");
    Ok(count)
}
