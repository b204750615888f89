//! Error types for the conformance toolkit

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type for registry loading operations
pub type Result<T> = std::result::Result<T, SchemaLoadError>;

/// Fatal faults raised while populating the schema registry.
///
/// These abort before any document processing. Everything discovered while
/// reading or validating a document is accumulated as a [`Diagnostic`]
/// instead and never short-circuits traversal.
#[derive(Error, Debug)]
pub enum SchemaLoadError {
    #[error("Unknown cardinality token '{token}' for {identity}")]
    UnknownCardinality { token: String, identity: String },

    #[error("Calendar '{calendar}' references unknown month '{month}'")]
    UnknownMonth { calendar: String, month: String },

    #[error("Duplicate structure identity '{0}'")]
    DuplicateIdentity(String),
}

/// Category of an accumulated finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCategory {
    /// Non-integer level, empty tag, malformed xref, ordering violations
    StructuralSyntax,
    /// Tag invalid under its resolved parent
    Placement,
    /// Missing required child or too many children of one identity
    Cardinality,
    /// Payload fails its type-specific grammar
    PayloadFormat,
    /// Pointer target missing or of the wrong record type
    UnresolvedPointer,
    /// Faults in the toolkit itself, e.g. an unhandled payload type
    Internal,
}

/// A single line-tagged finding.
///
/// Diagnostics are collected in document order; callers must not assume
/// processing stopped at the first one.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    pub category: DiagnosticCategory,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, category: DiagnosticCategory, message: impl Into<String>) -> Self {
        Self {
            line,
            category,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::new(7, DiagnosticCategory::Placement, "DATE is not valid here");
        assert_eq!(d.to_string(), "Line 7: DATE is not valid here");
    }
}
