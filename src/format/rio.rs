//! Turtle family syntaxes through `rio_turtle`

use std::collections::HashMap;

use rio_api::formatter::{QuadsFormatter, TriplesFormatter};
use rio_api::model::{BlankNode, Literal, NamedNode, Quad, Subject, Term};
use rio_api::parser::{QuadsParser, TriplesParser};
use rio_turtle::{
    NQuadsFormatter, NQuadsParser, NTriplesFormatter, NTriplesParser, TriGFormatter, TriGParser,
    TurtleFormatter, TurtleParser,
};

use super::RdfFormat;
use crate::error::{RdfError, RdfResult};
use crate::types::{is_iri, RdfGraph, Triple};

/// Parse an RDF document; quads lose their graph name.
///
/// `@prefix` declarations of Turtle and TriG documents are returned in the
/// graph's prefix table on top of the seeded vocabularies.
pub(super) fn parse(input: &str, format: RdfFormat) -> RdfResult<RdfGraph> {
    let mut triples = Vec::new();
    let reader = input.as_bytes();
    let mut declared = HashMap::new();

    match format {
        RdfFormat::Turtle => {
            let mut parser = TurtleParser::new(reader, None);
            parser.parse_all(&mut |t: rio_api::model::Triple<'_>| -> RdfResult<()> {
                triples.push(convert(t.subject, t.predicate, t.object)?);
                Ok(())
            })?;
            declared = parser.prefixes().clone();
        }
        RdfFormat::NTriples => NTriplesParser::new(reader).parse_all(
            &mut |t: rio_api::model::Triple<'_>| -> RdfResult<()> {
                triples.push(convert(t.subject, t.predicate, t.object)?);
                Ok(())
            },
        )?,
        RdfFormat::NQuads => NQuadsParser::new(reader).parse_all(
            &mut |q: Quad<'_>| -> RdfResult<()> {
                triples.push(convert(q.subject, q.predicate, q.object)?);
                Ok(())
            },
        )?,
        RdfFormat::TriG => {
            let mut parser = TriGParser::new(reader, None);
            parser.parse_all(&mut |q: Quad<'_>| -> RdfResult<()> {
                triples.push(convert(q.subject, q.predicate, q.object)?);
                Ok(())
            })?;
            declared = parser.prefixes().clone();
        }
        RdfFormat::Json => {
            return Err(RdfError::invalid("JSON documents are not an RDF syntax"));
        }
    }

    let mut graph = RdfGraph::with_triples(triples);
    for (name, namespace) in declared {
        if is_prefix_name(&name) && is_iri(&namespace) {
            let token = format!("{}:", name);
            graph.prefixes.retain(|_, t| *t != token);
            graph.prefixes.insert(namespace, token);
        }
    }
    Ok(graph)
}

/// Serialize a graph in one of the Turtle family syntaxes
pub(super) fn write(graph: &RdfGraph, format: RdfFormat) -> RdfResult<String> {
    let mut output = Vec::new();

    match format {
        RdfFormat::Turtle => {
            write_prefix_header(graph, &mut output);
            let mut formatter = TurtleFormatter::new(&mut output);
            for triple in &graph.triples {
                formatter.format(&to_rio(triple)).map_err(serialize_error)?;
            }
            formatter.finish().map_err(serialize_error)?;
        }
        RdfFormat::TriG => {
            write_prefix_header(graph, &mut output);
            let mut formatter = TriGFormatter::new(&mut output);
            for triple in &graph.triples {
                formatter.format(&in_default_graph(triple)).map_err(serialize_error)?;
            }
            formatter.finish().map_err(serialize_error)?;
        }
        RdfFormat::NTriples => {
            let mut formatter = NTriplesFormatter::new(&mut output);
            for triple in &graph.triples {
                formatter.format(&to_rio(triple)).map_err(serialize_error)?;
            }
        }
        RdfFormat::NQuads => {
            let mut formatter = NQuadsFormatter::new(&mut output);
            for triple in &graph.triples {
                formatter.format(&in_default_graph(triple)).map_err(serialize_error)?;
            }
        }
        RdfFormat::Json => {
            return Err(RdfError::invalid("JSON documents are not an RDF syntax"));
        }
    }

    String::from_utf8(output).map_err(serialize_error)
}

fn serialize_error(err: impl std::fmt::Display) -> RdfError {
    RdfError::Serialize(err.to_string())
}

/// Check if a name can be declared as a Turtle prefix (`name:`)
pub(crate) fn is_prefix_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// `@prefix` lines for every declarable entry of the prefix table
fn write_prefix_header(graph: &RdfGraph, output: &mut Vec<u8>) {
    let mut declared = false;
    for (namespace, token) in &graph.prefixes {
        let name = token.trim_end_matches(':');
        if is_prefix_name(name) && is_iri(namespace) {
            output.extend_from_slice(format!("@prefix {}: <{}> .\n", name, namespace).as_bytes());
            declared = true;
        }
    }
    if declared {
        output.push(b'\n');
    }
}

fn to_rio(triple: &Triple) -> rio_api::model::Triple<'_> {
    let subject = match triple.subject.strip_prefix("_:") {
        Some(id) => Subject::BlankNode(BlankNode { id }),
        None => Subject::NamedNode(NamedNode {
            iri: &triple.subject,
        }),
    };

    let object = if triple.is_literal {
        let value = triple.object.as_str();
        Term::Literal(
            match (triple.language.as_deref(), triple.datatype.as_deref()) {
                (Some(language), _) => Literal::LanguageTaggedString { value, language },
                (None, Some(datatype)) => Literal::Typed {
                    value,
                    datatype: NamedNode { iri: datatype },
                },
                (None, None) => Literal::Simple { value },
            },
        )
    } else {
        match triple.object.strip_prefix("_:") {
            Some(id) => Term::BlankNode(BlankNode { id }),
            None => Term::NamedNode(NamedNode {
                iri: &triple.object,
            }),
        }
    };

    rio_api::model::Triple {
        subject,
        predicate: NamedNode {
            iri: &triple.predicate,
        },
        object,
    }
}

fn in_default_graph(triple: &Triple) -> Quad<'_> {
    let rio_api::model::Triple {
        subject,
        predicate,
        object,
    } = to_rio(triple);
    Quad {
        subject,
        predicate,
        object,
        graph_name: None,
    }
}

fn convert(subject: Subject<'_>, predicate: NamedNode<'_>, object: Term<'_>) -> RdfResult<Triple> {
    let subject = match subject {
        Subject::NamedNode(n) => n.iri.to_string(),
        Subject::BlankNode(b) => format!("_:{}", b.id),
        _ => return Err(RdfError::Parse("Quoted triples are not supported".to_string())),
    };
    let predicate = predicate.iri.to_string();

    let triple = match object {
        Term::NamedNode(n) => Triple::new(subject, predicate, n.iri),
        Term::BlankNode(b) => Triple::new(subject, predicate, format!("_:{}", b.id)),
        Term::Literal(Literal::Simple { value }) => Triple::literal(subject, predicate, value),
        Term::Literal(Literal::LanguageTaggedString { value, language }) => {
            Triple::literal(subject, predicate, value).with_language(language)
        }
        Term::Literal(Literal::Typed { value, datatype }) => {
            Triple::literal(subject, predicate, value).with_datatype(datatype.iri)
        }
        _ => return Err(RdfError::Parse("Quoted triples are not supported".to_string())),
    };

    Ok(triple)
}
