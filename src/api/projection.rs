//! Node/edge projection of the triple store

use std::collections::HashMap;

use crate::types::{RdfGraph, VisEdge, VisNode, VisualizationData};

/// Project a graph onto nodes and edges.
///
/// Ids are assigned in first-seen order on every call; edge ids carry the
/// triple's position and change whenever earlier triples are removed.
/// Literal objects produce no node and no edge.
pub fn convert_to_visualization(graph: &RdfGraph) -> VisualizationData {
    let mut ids = FirstSeen::default();

    for triple in &graph.triples {
        ids.id_of(&triple.subject);
        if !triple.is_literal {
            ids.id_of(&triple.object);
        }
    }

    let edges = graph
        .triples
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.is_literal)
        .map(|(index, t)| VisEdge {
            id: format!("edge_{}", index),
            from: ids.id_of(&t.subject),
            to: ids.id_of(&t.object),
            label: t.predicate.clone(),
            arrows: "to".to_string(),
        })
        .collect();

    let nodes = ids
        .into_values()
        .into_iter()
        .enumerate()
        .map(|(id, label)| VisNode {
            id,
            label,
            shape: "dot".to_string(),
        })
        .collect();

    VisualizationData { nodes, edges }
}

/// Prefix tokens of the table followed by per-triple namespace hints, in
/// first-seen order without duplicates.
///
/// The hint for an `http(s)` IRI is its scheme and host; for any other
/// value it is the text after the first `:`.
pub fn extract_prefixes(graph: &RdfGraph) -> Vec<String> {
    let mut seen = FirstSeen::default();

    for token in graph.prefixes.values() {
        seen.id_of(token);
    }

    for triple in &graph.triples {
        let mut values = vec![triple.subject.as_str(), triple.predicate.as_str()];
        if !triple.is_literal {
            values.push(triple.object.as_str());
        }
        for hint in values.into_iter().filter_map(namespace_hint) {
            seen.id_of(hint);
        }
    }

    seen.into_values()
}

fn namespace_hint(value: &str) -> Option<&str> {
    for scheme in ["http://", "https://"] {
        if let Some(rest) = value.strip_prefix(scheme) {
            let host_end = rest.find('/')?;
            return Some(&value[..scheme.len() + host_end]);
        }
    }
    value
        .split_once(':')
        .map(|(_, rest)| rest)
        .filter(|rest| !rest.is_empty())
}

/// Dense ids for strings in order of first appearance
#[derive(Default)]
struct FirstSeen {
    index: HashMap<String, usize>,
    values: Vec<String>,
}

impl FirstSeen {
    fn id_of(&mut self, value: &str) -> usize {
        if let Some(&id) = self.index.get(value) {
            return id;
        }
        let id = self.values.len();
        self.index.insert(value.to_string(), id);
        self.values.push(value.to_string());
        id
    }

    fn into_values(self) -> Vec<String> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Triple;

    #[test]
    fn test_ten_triples_project_to_ten_edges() {
        let triples: Vec<Triple> = (0..10)
            .map(|i| {
                Triple::new(
                    format!("http://example.org/n{}", i % 4),
                    "http://example.org/linksTo",
                    format!("http://example.org/n{}", (i + 1) % 6),
                )
            })
            .collect();
        let graph = RdfGraph::with_triples(triples);

        let data = convert_to_visualization(&graph);
        assert_eq!(data.edge_count(), 10);
        assert_eq!(data.node_count(), 6);
        assert!(data.nodes.iter().enumerate().all(|(i, n)| n.id == i && n.shape == "dot"));
    }

    #[test]
    fn test_literal_objects_are_not_nodes() {
        let graph = RdfGraph::with_triples(vec![
            Triple::new("http://ex.org/a", "http://ex.org/knows", "http://ex.org/b"),
            Triple::literal("http://ex.org/a", "http://ex.org/name", "A"),
            Triple::new("http://ex.org/b", "http://ex.org/knows", "http://ex.org/a"),
        ]);

        let data = convert_to_visualization(&graph);
        assert_eq!(data.node_count(), 2);
        assert_eq!(data.edges.len(), 2);

        assert_eq!(data.edges[0].id, "edge_0");
        assert_eq!(data.edges[1].id, "edge_2");
        assert_eq!((data.edges[1].from, data.edges[1].to), (1, 0));
        assert_eq!(data.edges[1].label, "http://ex.org/knows");
        assert_eq!(data.edges[1].arrows, "to");
    }

    #[test]
    fn test_extract_prefixes() {
        let graph = RdfGraph::with_triples(vec![
            Triple::new("http://example.org/a", "foaf:knows", "_:b0"),
            Triple::literal("https://data.org/x", "http://example.org/p", "not:a namespace"),
        ]);

        let prefixes = extract_prefixes(&graph);
        assert!(prefixes.contains(&"rdf:".to_string()));

        let hints: Vec<&str> = prefixes
            .iter()
            .skip(graph.prefixes.len())
            .map(String::as_str)
            .collect();
        assert_eq!(hints, vec!["http://example.org", "knows", "b0", "https://data.org"]);
    }
}
