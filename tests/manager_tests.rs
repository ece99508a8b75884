//! Integration tests for the file-backed knowledge graph manager

use std::fs;
use std::sync::Arc;
use std::thread;

use rdf_graph::{KnowledgeGraphManager, RdfFormat, Triple, TriplePattern};
use tempfile::tempdir;

fn knows(from: &str, to: &str) -> Triple {
    Triple::new(
        format!("http://example.org/{}", from),
        "http://xmlns.com/foaf/0.1/knows",
        format!("http://example.org/{}", to),
    )
}

#[test]
fn test_adding_twice_keeps_one_copy() {
    let dir = tempdir().unwrap();
    let manager = KnowledgeGraphManager::with_file(dir.path().join("store.ttl"));

    let first = manager.add_triples(vec![knows("a", "b")]).unwrap();
    let second = manager.add_triples(vec![knows("a", "b")]).unwrap();

    assert_eq!(first.len() + second.len(), 1);
    assert_eq!(manager.triple_count().unwrap(), 1);
}

#[test]
fn test_prefixed_input_is_stored_expanded() {
    let dir = tempdir().unwrap();
    let manager = KnowledgeGraphManager::with_file(dir.path().join("store.ttl"));

    manager
        .add_triples(vec![Triple::new("http://example.org/a", "rdf:type", "foaf:Person")])
        .unwrap();

    let stored = manager.read_graph().unwrap();
    assert_eq!(stored.triples[0].predicate, "http://www.w3.org/1999/02/22-rdf-syntax-ns#type");
    assert_eq!(stored.triples[0].object, "http://xmlns.com/foaf/0.1/Person");
}

#[test]
fn test_remove_matching_pattern() {
    let dir = tempdir().unwrap();
    let manager = KnowledgeGraphManager::with_file(dir.path().join("store.nt"));
    manager
        .add_triples(vec![
            knows("a", "b"),
            knows("a", "c"),
            knows("b", "c"),
            Triple::literal("http://example.org/a", "http://xmlns.com/foaf/0.1/name", "A"),
        ])
        .unwrap();

    let pattern = TriplePattern::any()
        .with_subject("http://example.org/a")
        .with_predicate("foaf:knows");
    let removed = manager.remove_triples(&[pattern]).unwrap();

    assert_eq!(removed, 2);
    let left = manager.query_triples(&TriplePattern::any()).unwrap();
    assert_eq!(left.len(), 2);
    assert!(left.contains(&knows("b", "c")));
}

#[test]
fn test_graph_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("store.ttl");

    {
        let manager = KnowledgeGraphManager::with_file(&path);
        manager
            .add_triples(vec![
                knows("a", "b"),
                Triple::literal("http://example.org/a", "http://xmlns.com/foaf/0.1/name", "Alice").with_language("en"),
                Triple::literal("http://example.org/a", "http://example.org/age", "42")
                    .with_datatype("http://www.w3.org/2001/XMLSchema#integer"),
            ])
            .unwrap();
    }
    assert!(path.exists());

    let reopened = KnowledgeGraphManager::with_file(&path);
    let mut expected = vec![
        knows("a", "b"),
        Triple::literal("http://example.org/a", "http://xmlns.com/foaf/0.1/name", "Alice").with_language("en"),
        Triple::literal("http://example.org/a", "http://example.org/age", "42")
            .with_datatype("http://www.w3.org/2001/XMLSchema#integer"),
    ];
    let mut actual = reopened.query_triples(&TriplePattern::any()).unwrap();
    expected.sort_by(|a, b| a.predicate.cmp(&b.predicate));
    actual.sort_by(|a, b| a.predicate.cmp(&b.predicate));
    assert_eq!(actual, expected);
}

#[test]
fn test_malformed_file_errors_then_recovers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.ttl");
    fs::write(&path, "this is <not turtle").unwrap();

    let manager = KnowledgeGraphManager::with_file(&path);
    let err = manager.read_graph().unwrap_err();
    assert!(err.is_client_error());

    // A failed load is retried on the next access
    fs::write(&path, "<http://example.org/a> <http://example.org/p> <http://example.org/b> .\n").unwrap();
    assert_eq!(manager.triple_count().unwrap(), 1);
}

#[test]
fn test_jsonld_path_is_written_as_turtle() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("memory.jsonld");

    let manager = KnowledgeGraphManager::with_file(&path);
    manager.add_triples(vec![knows("a", "b")]).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("<http://example.org/a>"));
    assert_eq!(
        RdfFormat::Turtle.decode(&content).unwrap().triples,
        vec![knows("a", "b")]
    );
}

#[test]
fn test_json_store_keeps_prefixes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");

    {
        let manager = KnowledgeGraphManager::with_file(&path);
        manager.add_prefix("ex", "http://example.org/").unwrap();
        manager.add_triples(vec![Triple::new("ex:a", "ex:p", "ex:b")]).unwrap();
    }

    let reopened = KnowledgeGraphManager::with_file(&path);
    let prefixes = reopened.prefixes().unwrap();
    assert_eq!(prefixes.get("http://example.org/").map(String::as_str), Some("ex:"));
    assert_eq!(
        reopened.read_graph().unwrap().triples,
        vec![Triple::new("http://example.org/a", "http://example.org/p", "http://example.org/b")]
    );
}

#[test]
fn test_turtle_store_keeps_prefixes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.ttl");

    {
        let manager = KnowledgeGraphManager::with_file(&path);
        manager.add_prefix("ex", "http://example.org/").unwrap();
        manager.add_triples(vec![Triple::new("ex:a", "ex:p", "ex:b")]).unwrap();
    }
    assert!(std::fs::read_to_string(&path)
        .unwrap()
        .contains("@prefix ex: <http://example.org/>"));

    let reopened = KnowledgeGraphManager::with_file(&path);
    let prefixes = reopened.prefixes().unwrap();
    assert_eq!(prefixes.get("http://example.org/").map(String::as_str), Some("ex:"));
    assert_eq!(
        reopened.display_graph().unwrap().triples,
        vec![Triple::new("ex:a", "ex:p", "ex:b")]
    );
}

#[test]
fn test_concurrent_adds() {
    let dir = tempdir().unwrap();
    let manager = Arc::new(KnowledgeGraphManager::with_file(dir.path().join("store.nt")));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                for j in 0..10 {
                    manager
                        .add_triples(vec![knows(&format!("t{}", i), &format!("n{}", j))])
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(manager.triple_count().unwrap(), 80);
    let reopened = KnowledgeGraphManager::with_file(dir.path().join("store.nt"));
    assert_eq!(reopened.triple_count().unwrap(), 80);
}
