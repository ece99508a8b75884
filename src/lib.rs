//! RDF Graph Server
//!
//! An in-memory RDF triple store persisted to a single file, with a live
//! node/edge view pushed to browsers and an LLM chat that edits the graph
//! through tool calls.
//!
//! # Modules
//!
//! - `types`: Core data structures (Triple, TriplePattern, RdfGraph)
//! - `format`: Turtle, N-Triples, N-Quads, TriG and JSON codecs
//! - `store`: Persistence backends behind the `GraphStore` trait
//! - `manager`: Serialized read-modify-persist access to the graph
//! - `tools`: Tool catalog and dispatch for chat completions
//! - `chat`: Completion backend and the tool-calling loop
//! - `api`: HTTP routes and the viewer WebSocket
//! - `config`: Environment-driven settings
//!
//! # Example
//!
//! ```no_run
//! use rdf_graph::{KnowledgeGraphManager, Triple};
//!
//! let manager = KnowledgeGraphManager::with_file("rdf-store.ttl");
//! manager
//!     .add_triples(vec![Triple::new("http://example.org/alice", "foaf:knows", "http://example.org/bob")])
//!     .unwrap();
//! ```

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod format;
pub mod manager;
pub mod store;
pub mod tools;
pub mod types;

// Re-export commonly used items at crate root
pub use api::http::create_router;
pub use api::websocket::AppState;
pub use config::Config;
pub use error::{RdfError, RdfResult};
pub use format::RdfFormat;
pub use manager::KnowledgeGraphManager;
pub use store::{FileStore, GraphStore, MemoryStore};
pub use types::{RdfGraph, Triple, TriplePattern};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
