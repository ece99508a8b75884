//! Serialization formats
//!
//! Supports:
//! - Turtle (.ttl), also used for `.jsonld` paths
//! - N-Triples (.nt)
//! - N-Quads (.nq), read and written in the default graph
//! - TriG (.trig), read and written in the default graph
//! - JSON graph documents `{triples, prefixes}` (.json)

mod json;
mod rio;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{RdfError, RdfResult};
use crate::types::RdfGraph;

/// Extensions recognised as graph files
pub const RDF_EXTENSIONS: &[&str] = &["ttl", "nt", "nq", "trig", "json", "jsonld"];

/// Supported graph syntaxes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RdfFormat {
    #[serde(alias = "ttl")]
    Turtle,
    #[serde(alias = "nt", alias = "n-triples")]
    NTriples,
    #[serde(alias = "nq", alias = "n-quads")]
    NQuads,
    TriG,
    Json,
}

impl RdfFormat {
    /// Pick the format for a backing file from its extension.
    ///
    /// `.jsonld` is not supported as JSON-LD and falls back to Turtle; so
    /// does any unknown extension.
    pub fn from_extension(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "nt" => RdfFormat::NTriples,
            "nq" => RdfFormat::NQuads,
            "trig" => RdfFormat::TriG,
            "json" => RdfFormat::Json,
            "ttl" => RdfFormat::Turtle,
            "jsonld" => {
                warn!(
                    path = %path.display(),
                    "JSON-LD is not supported, reading and writing the file as Turtle"
                );
                RdfFormat::Turtle
            }
            _ => RdfFormat::Turtle,
        }
    }

    /// Parse a user-supplied format name or file extension
    pub fn from_name(name: &str) -> RdfResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "turtle" | "ttl" | "jsonld" => Ok(RdfFormat::Turtle),
            "ntriples" | "n-triples" | "nt" => Ok(RdfFormat::NTriples),
            "nquads" | "n-quads" | "nq" => Ok(RdfFormat::NQuads),
            "trig" => Ok(RdfFormat::TriG),
            "json" => Ok(RdfFormat::Json),
            other => Err(RdfError::invalid(format!("unsupported RDF format '{}'", other))),
        }
    }

    /// Check if a path carries one of the recognised graph extensions
    pub fn is_graph_file(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| RDF_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// Canonical file extension
    pub fn file_extension(&self) -> &'static str {
        match self {
            RdfFormat::Turtle => "ttl",
            RdfFormat::NTriples => "nt",
            RdfFormat::NQuads => "nq",
            RdfFormat::TriG => "trig",
            RdfFormat::Json => "json",
        }
    }

    /// Media type used for downloads
    pub fn media_type(&self) -> &'static str {
        match self {
            RdfFormat::Turtle => "text/turtle",
            RdfFormat::NTriples => "application/n-triples",
            RdfFormat::NQuads => "application/n-quads",
            RdfFormat::TriG => "application/trig",
            RdfFormat::Json => "application/json",
        }
    }

    /// Parse a document into a graph
    pub fn decode(&self, input: &str) -> RdfResult<RdfGraph> {
        match self {
            RdfFormat::Json => json::decode(input),
            syntax => rio::parse(input, *syntax),
        }
    }

    /// Serialize a graph; the whole document is produced in memory
    pub fn encode(&self, graph: &RdfGraph) -> RdfResult<String> {
        match self {
            RdfFormat::Json => json::encode(graph),
            syntax => rio::write(graph, *syntax),
        }
    }
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RdfFormat::Turtle => "turtle",
            RdfFormat::NTriples => "ntriples",
            RdfFormat::NQuads => "nquads",
            RdfFormat::TriG => "trig",
            RdfFormat::Json => "json",
        };
        f.write_str(name)
    }
}
