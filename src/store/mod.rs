//! Graph persistence
//!
//! The manager is handed a `GraphStore` at construction and never looks at
//! the filesystem itself.

mod file;

pub use file::FileStore;

use crate::error::RdfResult;
use crate::types::RdfGraph;

/// Backing storage for a whole graph
pub trait GraphStore: Send + Sync {
    /// Load the stored graph; `None` when nothing has been stored yet
    fn load(&self) -> RdfResult<Option<RdfGraph>>;

    /// Replace the stored graph
    fn save(&self, graph: &RdfGraph) -> RdfResult<()>;

    /// Human readable location, used in logs
    fn describe(&self) -> String;
}

/// Store that keeps nothing; the graph lives only as long as the process
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryStore;

impl GraphStore for MemoryStore {
    fn load(&self) -> RdfResult<Option<RdfGraph>> {
        Ok(None)
    }

    fn save(&self, _graph: &RdfGraph) -> RdfResult<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}
