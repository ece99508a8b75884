//! Triple and triple-pattern types

use serde::{Deserialize, Serialize};

use super::is_false;
use crate::error::{RdfError, RdfResult};

/// RDF statement with an optional literal annotation on the object
///
/// Two triples are duplicates iff every field matches exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(rename = "isLiteral", default, skip_serializing_if = "is_false")]
    pub is_literal: bool,
}

impl Triple {
    /// Create a triple whose object is an IRI or blank node
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            datatype: None,
            language: None,
            is_literal: false,
        }
    }

    /// Create a triple with a plain literal object
    pub fn literal(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            is_literal: true,
            ..Self::new(subject, predicate, value)
        }
    }

    /// Attach a datatype IRI, turning the object into a typed literal
    pub fn with_datatype(mut self, datatype: impl Into<String>) -> Self {
        self.datatype = Some(datatype.into());
        self.is_literal = true;
        self
    }

    /// Attach a language tag, turning the object into a language-tagged literal
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self.is_literal = true;
        self
    }

    /// Canonical form used before comparing or storing a triple.
    ///
    /// A datatype or language tag implies a literal, and an object written in
    /// quoted literal syntax (`"v"`, `"v"@en`, `"v"^^<dt>`) is split into its
    /// value and annotations. Any other object that is neither an IRI nor a
    /// blank node is taken as a plain literal.
    pub fn normalized(mut self) -> Self {
        if self.datatype.is_some() || self.language.is_some() {
            self.is_literal = true;
        }
        if !self.is_literal {
            if let Some((value, language, datatype)) = split_quoted_literal(&self.object) {
                self.object = value;
                self.language = language;
                self.datatype = datatype;
                self.is_literal = true;
            } else if !is_resource(&self.object) {
                self.is_literal = true;
            }
        }
        self
    }

    /// Check that subject, predicate and a non-literal object are usable as
    /// RDF terms
    pub fn validate(&self) -> RdfResult<()> {
        if !is_resource(&self.subject) {
            return Err(RdfError::invalid(format!(
                "subject '{}' is neither an IRI nor a blank node",
                self.subject
            )));
        }
        if !is_iri(&self.predicate) {
            return Err(RdfError::invalid(format!(
                "predicate '{}' is not an IRI",
                self.predicate
            )));
        }
        if !self.is_literal && !is_resource(&self.object) {
            return Err(RdfError::invalid(format!(
                "object '{}' is neither an IRI, a blank node nor a literal",
                self.object
            )));
        }
        if let Some(datatype) = &self.datatype {
            if !is_iri(datatype) {
                return Err(RdfError::invalid(format!(
                    "datatype '{}' is not an IRI",
                    datatype
                )));
            }
        }
        Ok(())
    }
}

/// Partial triple used for queries and removals.
///
/// Absent fields match anything, present fields must match exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriplePattern {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(rename = "isLiteral", default, skip_serializing_if = "Option::is_none")]
    pub is_literal: Option<bool>,
}

impl TriplePattern {
    /// Pattern matching every triple
    pub fn any() -> Self {
        Self::default()
    }

    /// Pattern on subject, predicate and object only
    pub fn spo(triple: &Triple) -> Self {
        Self {
            subject: Some(triple.subject.clone()),
            predicate: Some(triple.predicate.clone()),
            object: Some(triple.object.clone()),
            ..Self::default()
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    pub fn with_object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }

    /// Check if no field is constrained
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check a triple against every present field
    pub fn matches(&self, triple: &Triple) -> bool {
        fn field(expected: &Option<String>, actual: &str) -> bool {
            expected.as_deref().map_or(true, |e| e == actual)
        }
        fn optional(expected: &Option<String>, actual: &Option<String>) -> bool {
            expected.is_none() || expected == actual
        }

        field(&self.subject, &triple.subject)
            && field(&self.predicate, &triple.predicate)
            && field(&self.object, &triple.object)
            && optional(&self.datatype, &triple.datatype)
            && optional(&self.language, &triple.language)
            && self.is_literal.map_or(true, |l| l == triple.is_literal)
    }
}

impl From<&Triple> for TriplePattern {
    fn from(triple: &Triple) -> Self {
        Self {
            subject: Some(triple.subject.clone()),
            predicate: Some(triple.predicate.clone()),
            object: Some(triple.object.clone()),
            datatype: triple.datatype.clone(),
            language: triple.language.clone(),
            is_literal: Some(triple.is_literal),
        }
    }
}

/// Check if a value is a blank node identifier (`_:id`)
pub fn is_blank_node(value: &str) -> bool {
    value.len() > 2 && value.starts_with("_:")
}

/// Check if a value looks like an absolute IRI: a scheme followed by `:` and
/// no characters Turtle forbids inside `<...>`
pub fn is_iri(value: &str) -> bool {
    let Some((scheme, _)) = value.split_once(':') else {
        return false;
    };
    let mut scheme_chars = scheme.chars();
    let scheme_ok = scheme_chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && scheme_chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    scheme_ok
        && !value.chars().any(|c| {
            c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\')
        })
}

fn is_resource(value: &str) -> bool {
    is_blank_node(value) || is_iri(value)
}

/// Split `"value"`, `"value"@lang` or `"value"^^<datatype>` into its parts
fn split_quoted_literal(object: &str) -> Option<(String, Option<String>, Option<String>)> {
    let rest = object.strip_prefix('"')?;
    let close = rest.rfind('"')?;
    let value = rest[..close].to_string();
    let suffix = &rest[close + 1..];

    if suffix.is_empty() {
        Some((value, None, None))
    } else if let Some(language) = suffix.strip_prefix('@') {
        (!language.is_empty()).then(|| (value, Some(language.to_string()), None))
    } else if let Some(datatype) = suffix.strip_prefix("^^") {
        let datatype = datatype.trim_start_matches('<').trim_end_matches('>');
        (!datatype.is_empty()).then(|| (value, None, Some(datatype.to_string())))
    } else {
        None
    }
}
