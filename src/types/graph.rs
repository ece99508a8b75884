//! RDF graph container type

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Triple;

/// Namespace IRI (ending in `#` or `/`) mapped to its short token (`rdf:`)
pub type PrefixTable = BTreeMap<String, String>;

/// Vocabularies every new graph knows about
const DEFAULT_PREFIXES: &[(&str, &str)] = &[
    ("http://www.w3.org/1999/02/22-rdf-syntax-ns#", "rdf:"),
    ("http://www.w3.org/2000/01/rdf-schema#", "rdfs:"),
    ("http://www.w3.org/2002/07/owl#", "owl:"),
    ("http://www.w3.org/2001/XMLSchema#", "xsd:"),
    ("http://xmlns.com/foaf/0.1/", "foaf:"),
    ("http://schema.org/", "schema:"),
    ("http://purl.org/dc/elements/1.1/", "dc:"),
    ("http://www.benchmark.org/family#", "family:"),
];

/// Seeded prefix table used at graph creation
pub fn default_prefixes() -> PrefixTable {
    DEFAULT_PREFIXES
        .iter()
        .map(|(namespace, token)| (namespace.to_string(), token.to_string()))
        .collect()
}

/// Ordered list of triples plus the prefix table used for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RdfGraph {
    #[serde(default)]
    pub triples: Vec<Triple>,
    #[serde(default = "default_prefixes", alias = "prefixMap")]
    pub prefixes: PrefixTable,
}

impl Default for RdfGraph {
    fn default() -> Self {
        Self {
            triples: Vec::new(),
            prefixes: default_prefixes(),
        }
    }
}

impl RdfGraph {
    /// Create an empty graph seeded with the default prefixes
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a seeded graph holding the given triples
    pub fn with_triples(triples: Vec<Triple>) -> Self {
        Self {
            triples,
            ..Self::default()
        }
    }

    /// Check if the graph holds no triples
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Get the number of triples
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Check if an identical triple is stored
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.iter().any(|t| t == triple)
    }

    /// Look up the namespace registered for a token such as `rdf:`
    pub fn namespace_for(&self, token: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|(_, t)| t.as_str() == token)
            .map(|(namespace, _)| namespace.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_graph_is_seeded() {
        let graph = RdfGraph::new();
        assert!(graph.is_empty());
        assert_eq!(graph.prefixes.len(), DEFAULT_PREFIXES.len());
        assert_eq!(
            graph.namespace_for("rdf:"),
            Some("http://www.w3.org/1999/02/22-rdf-syntax-ns#")
        );
        assert_eq!(graph.namespace_for("family:"), Some("http://www.benchmark.org/family#"));
    }

    #[test]
    fn test_json_document_without_prefixes_gets_defaults() {
        let graph: RdfGraph = serde_json::from_str(
            r#"{"triples":[{"subject":"http://ex.org/a","predicate":"http://ex.org/p","object":"http://ex.org/b"}]}"#,
        )
        .unwrap();
        assert_eq!(graph.len(), 1);
        assert!(graph.prefixes.contains_key("http://www.w3.org/2002/07/owl#"));
    }

    #[test]
    fn test_prefix_map_alias() {
        let graph: RdfGraph =
            serde_json::from_str(r#"{"triples":[],"prefixMap":{"http://ex.org/":"ex:"}}"#).unwrap();
        assert_eq!(graph.namespace_for("ex:"), Some("http://ex.org/"));
    }
}
