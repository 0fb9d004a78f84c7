use regex::Regex;
use std::sync::LazyLock;

use crate::error::{GraphError, Result};

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Which part of a query an interpolated identifier lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Label,
    RelationshipType,
    PropertyKey,
}

impl IdentifierKind {
    fn as_str(&self) -> &'static str {
        match self {
            IdentifierKind::Label => "label",
            IdentifierKind::RelationshipType => "relationship type",
            IdentifierKind::PropertyKey => "property key",
        }
    }
}

/// Labels, relationship types and property keys are spliced into query text
/// rather than bound, so they must be plain identifiers.
pub fn validate(kind: IdentifierKind, value: &str) -> Result<&str> {
    if IDENTIFIER_RE.is_match(value) {
        Ok(value)
    } else {
        Err(GraphError::InvalidIdentifier {
            kind: kind.as_str(),
            value: value.to_string(),
        })
    }
}
