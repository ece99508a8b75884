//! IRI shortening and expansion through the prefix table

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{RdfError, RdfResult};
use crate::types::{is_blank_node, is_iri, PrefixTable, RdfGraph, Triple, TriplePattern};

use super::KnowledgeGraphManager;

/// Outcome of `add_prefix`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixChange {
    Added,
    Updated,
    Unchanged,
}

/// Shorten an IRI to `token:local`, registering a derived rule if no known
/// namespace matches.
///
/// Blank nodes and values without `://` pass through. A derived token that
/// already names a different namespace leaves the IRI unshortened.
pub fn shorten_iri(table: &mut PrefixTable, iri: &str) -> String {
    if is_blank_node(iri) || !has_authority(iri) {
        return iri.to_string();
    }

    let known = table
        .iter()
        .filter(|(namespace, _)| iri.len() > namespace.len() && iri.starts_with(namespace.as_str()))
        .max_by_key(|(namespace, _)| namespace.len());
    if let Some((namespace, token)) = known {
        return format!("{}{}", token, &iri[namespace.len()..]);
    }

    let Some((namespace, local)) = split_namespace(iri) else {
        return iri.to_string();
    };

    let token = format!("{}:", derive_token(namespace));
    let taken = table.iter().any(|(ns, t)| *t == token && ns != namespace);
    if taken {
        return iri.to_string();
    }

    debug!(namespace, token = %token, "Registered derived prefix");
    table.insert(namespace.to_string(), token.clone());
    format!("{}{}", token, local)
}

/// Expand `token:local` through the table; anything else passes through
pub fn expand_iri(table: &PrefixTable, name: &str) -> String {
    if has_authority(name) || is_blank_node(name) {
        return name.to_string();
    }
    let Some(colon) = name.find(':') else {
        return name.to_string();
    };

    let (token, local) = name.split_at(colon + 1);
    table
        .iter()
        .find(|(_, t)| t.as_str() == token)
        .map(|(namespace, _)| format!("{}{}", namespace, local))
        .unwrap_or_else(|| name.to_string())
}

/// `scheme://...` form; a `://` further along (e.g. in a query) does not count
fn has_authority(value: &str) -> bool {
    let Some((scheme, rest)) = value.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && rest.starts_with("//")
}

pub(crate) fn expand_triple(table: &PrefixTable, mut triple: Triple) -> Triple {
    triple.subject = expand_iri(table, &triple.subject);
    triple.predicate = expand_iri(table, &triple.predicate);
    if triple.is_literal {
        triple.datatype = triple.datatype.map(|d| expand_iri(table, &d));
    } else {
        triple.object = expand_iri(table, &triple.object);
    }
    triple
}

pub(crate) fn expand_pattern(table: &PrefixTable, mut pattern: TriplePattern) -> TriplePattern {
    pattern.subject = pattern.subject.map(|s| expand_iri(table, &s));
    pattern.predicate = pattern.predicate.map(|p| expand_iri(table, &p));
    pattern.datatype = pattern.datatype.map(|d| expand_iri(table, &d));
    if pattern.is_literal != Some(true) {
        pattern.object = pattern.object.map(|o| expand_iri(table, &o));
    }
    pattern
}

/// Split at the last `#` or `/` past the authority; `None` when the local
/// part would be empty
fn split_namespace(iri: &str) -> Option<(&str, &str)> {
    let authority = iri.find("://")? + 3;
    let separator = authority + iri[authority..].rfind(['#', '/'])?;
    let (namespace, local) = iri.split_at(separator + 1);
    (!local.is_empty()).then_some((namespace, local))
}

/// Token from the namespace's last path segment, else the host's first
/// label, else `ns`
fn derive_token(namespace: &str) -> String {
    let authority = namespace.find("://").map_or(0, |i| i + 3);
    let rest = &namespace[authority..];
    let trimmed = rest.trim_end_matches(['#', '/']);

    let segment = match trimmed.rfind(['#', '/']) {
        Some(i) => &trimmed[i + 1..],
        None => trimmed.split('.').next().unwrap_or_default(),
    };

    let mut token: String = segment
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if token.is_empty() {
        token = trimmed
            .split(['.', '/', '#'])
            .next()
            .unwrap_or_default()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
    }
    if token.is_empty() {
        return "ns".to_string();
    }
    if !token.starts_with(|c: char| c.is_ascii_alphabetic()) {
        token.insert_str(0, "ns");
    }
    token
}

fn normalize_token(prefix: &str) -> RdfResult<String> {
    let name = prefix.trim().trim_end_matches(':');
    if name.is_empty() || name.contains(':') || name.chars().any(char::is_whitespace) {
        return Err(RdfError::invalid(format!("invalid prefix '{}'", prefix)));
    }
    Ok(format!("{}:", name))
}

/// Map `prefix` to `uri`, replacing an earlier mapping of either side
pub fn add_prefix(manager: &KnowledgeGraphManager, prefix: &str, uri: &str) -> RdfResult<PrefixChange> {
    let token = normalize_token(prefix)?;
    if !is_iri(uri) {
        return Err(RdfError::invalid(format!("namespace '{}' is not an IRI", uri)));
    }

    let mut slot = manager.graph.write();
    let current = manager.ensure_loaded(&mut slot)?;

    if current.prefixes.get(uri) == Some(&token) {
        return Ok(PrefixChange::Unchanged);
    }

    let mut next = current.clone();
    let existed = next.namespace_for(&token).is_some() || next.prefixes.contains_key(uri);
    next.prefixes.retain(|_, t| *t != token);
    next.prefixes.insert(uri.to_string(), token.clone());
    manager.commit(&mut slot, next)?;

    debug!(token = %token, uri, "Prefix registered");
    Ok(if existed {
        PrefixChange::Updated
    } else {
        PrefixChange::Added
    })
}

/// Remove the mapping for `prefix`; false when it was not registered
pub fn delete_prefix(manager: &KnowledgeGraphManager, prefix: &str) -> RdfResult<bool> {
    let token = normalize_token(prefix)?;

    let mut slot = manager.graph.write();
    let current = manager.ensure_loaded(&mut slot)?;
    if current.namespace_for(&token).is_none() {
        return Ok(false);
    }

    let mut next = current.clone();
    next.prefixes.retain(|_, t| *t != token);
    manager.commit(&mut slot, next)?;

    debug!(token = %token, "Prefix deleted");
    Ok(true)
}

/// Current prefix table
pub fn prefixes(manager: &KnowledgeGraphManager) -> RdfResult<BTreeMap<String, String>> {
    let mut slot = manager.graph.write();
    Ok(manager.ensure_loaded(&mut slot)?.prefixes.clone())
}

/// Snapshot with IRIs shortened for display.
///
/// Newly derived rules stay in the table; they are persisted with the next
/// mutation.
pub fn display_graph(manager: &KnowledgeGraphManager) -> RdfResult<RdfGraph> {
    let mut slot = manager.graph.write();
    let graph = manager.ensure_loaded(&mut slot)?;

    let mut table = std::mem::take(&mut graph.prefixes);
    let triples = graph
        .triples
        .iter()
        .map(|t| {
            let mut short = t.clone();
            short.subject = shorten_iri(&mut table, &t.subject);
            short.predicate = shorten_iri(&mut table, &t.predicate);
            if !t.is_literal {
                short.object = shorten_iri(&mut table, &t.object);
            }
            short
        })
        .collect();
    graph.prefixes = table.clone();

    Ok(RdfGraph {
        triples,
        prefixes: table,
    })
}
