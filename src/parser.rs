//! Line tokenizer and document tree builder
//!
//! Converts an ordered sequence of raw lines into a tree of structure nodes.
//! Hierarchy is reconstructed from a path array of "most recently seen node
//! at each depth": the path is truncated to the new node's level *before*
//! attachment, so any branch previously explored at that depth or deeper is
//! discarded and later siblings cannot see earlier cousins' subtrees.

use tracing::debug;

use crate::document::{is_pointer_payload, Document, NodeId, StructureNode};
use crate::error::{Diagnostic, DiagnosticCategory};
use crate::registry::{SchemaRegistry, PARENT_RECORD, SOURCE_WILDCARD};
use crate::version::GedcomVersion;

/// Concatenating continuation, absorbed into the previous payload (5.5.1).
/// The line-break-preserving CONT stays a true child node.
const CONC_TAG: &str = "CONC";

struct ParsedLine {
    level: usize,
    xref: Option<String>,
    tag: String,
    payload: Option<String>,
}

/// Scan for the structural-metadata tag and its version sub-value, without
/// building a tree. The main parse then starts again from the first line;
/// no version guess is stateful across documents.
pub fn detect_version(lines: &[&str]) -> Option<GedcomVersion> {
    let mut gedc_level: Option<usize> = None;
    for raw in lines {
        let mut tokens = raw.split_whitespace();
        let level: usize = match tokens.next().and_then(|t| t.parse().ok()) {
            Some(l) => l,
            None => continue,
        };
        let tag = match tokens.next() {
            Some(t) => t,
            None => continue,
        };
        match gedc_level {
            None => {
                if tag == "GEDC" {
                    gedc_level = Some(level);
                }
            }
            Some(gl) => {
                if level <= gl {
                    gedc_level = None;
                    if tag == "GEDC" {
                        gedc_level = Some(level);
                    }
                } else if level == gl + 1 && tag == "VERS" {
                    let payload: Vec<&str> = tokens.collect();
                    return GedcomVersion::parse(&payload.join(" "));
                }
            }
        }
    }
    None
}

/// Tokenize one raw line into (level, xref, tag, payload).
fn parse_line(
    raw: &str,
    version: GedcomVersion,
    line_number: usize,
) -> Result<ParsedLine, Diagnostic> {
    let mut tokens = raw.split(' ').peekable();

    if version.tolerates_leading_whitespace() {
        while matches!(tokens.peek(), Some(&"")) {
            tokens.next();
        }
    } else if raw.starts_with(' ') {
        return Err(Diagnostic::new(
            line_number,
            DiagnosticCategory::StructuralSyntax,
            "line begins with whitespace",
        ));
    }

    let level_token = tokens.next().unwrap_or("");
    let level: usize = level_token.parse().map_err(|_| {
        Diagnostic::new(
            line_number,
            DiagnosticCategory::StructuralSyntax,
            format!("level '{level_token}' is not a non-negative integer"),
        )
    })?;

    let mut xref = None;
    if let Some(token) = tokens.peek() {
        if token.starts_with('@') {
            let mut candidate = tokens.next().unwrap_or("").to_string();
            // 5.5.1 permits an embedded space inside the delimited xref;
            // reassemble it from the following tokens.
            if version == GedcomVersion::V551 {
                while !(candidate.len() >= 3 && candidate.ends_with('@')) {
                    match tokens.next() {
                        Some(next) => {
                            candidate.push(' ');
                            candidate.push_str(next);
                        }
                        None => break,
                    }
                }
            }
            if candidate.len() < 3 || !candidate.ends_with('@') {
                return Err(Diagnostic::new(
                    line_number,
                    DiagnosticCategory::StructuralSyntax,
                    format!("malformed cross-reference identifier '{candidate}'"),
                ));
            }
            xref = Some(candidate);
        }
    }

    let tag = match tokens.next() {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => {
            return Err(Diagnostic::new(
                line_number,
                DiagnosticCategory::StructuralSyntax,
                "missing tag",
            ));
        }
    };

    // The payload is everything after the tag text plus one separator. The
    // tag is located by substring search within the raw line, which can
    // mis-anchor when the tag text recurs earlier in the line.
    let payload = match raw.find(&tag) {
        Some(idx) => {
            let after = &raw[idx + tag.len()..];
            if after.is_empty() {
                None
            } else {
                let rest = after.get(1..).unwrap_or("");
                if rest.is_empty() {
                    return Err(Diagnostic::new(
                        line_number,
                        DiagnosticCategory::StructuralSyntax,
                        "trailing separator with no payload",
                    ));
                }
                Some(rest.to_string())
            }
        }
        None => None,
    };

    Ok(ParsedLine {
        level,
        xref,
        tag,
        payload,
    })
}

/// Build a document tree from raw lines, resolving every node's schema as
/// it is constructed. Diagnostics accumulate; a rejected line never aborts
/// the parse.
pub fn load_document(
    registry: &mut SchemaRegistry,
    lines: &[&str],
    known_version: Option<GedcomVersion>,
) -> (Document, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();

    let version = match known_version.or_else(|| detect_version(lines)) {
        Some(v) => v,
        None => {
            diagnostics.push(Diagnostic::new(
                1,
                DiagnosticCategory::StructuralSyntax,
                "unable to detect format version, assuming 7.0",
            ));
            GedcomVersion::V70
        }
    };

    let mut doc = Document::new(version);
    doc.line_count = lines.len();
    let mut path: Vec<NodeId> = Vec::new();

    for (i, raw) in lines.iter().enumerate() {
        let line_number = i + 1;
        let parsed = match parse_line(raw, version, line_number) {
            Ok(p) => p,
            Err(diag) => {
                diagnostics.push(diag);
                continue;
            }
        };

        // 5.5.1 payload concatenation: absorbed into the previous node,
        // never a child of its own.
        if version == GedcomVersion::V551
            && parsed.tag == CONC_TAG
            && (parsed.level == path.len() || parsed.level + 1 == path.len())
        {
            if let Some(&last) = path.last() {
                let node = doc.node_mut(last);
                let mut payload = node.payload.take().unwrap_or_default();
                payload.push_str(parsed.payload.as_deref().unwrap_or(""));
                node.payload = Some(payload);
                continue;
            }
        }

        if parsed.xref.is_some() && parsed.level > 0 {
            diagnostics.push(Diagnostic::new(
                line_number,
                DiagnosticCategory::StructuralSyntax,
                "cross-reference identifier is only permitted on records",
            ));
        }

        let source = doc
            .source_product
            .clone()
            .unwrap_or_else(|| SOURCE_WILDCARD.to_string());
        let is_pointer = parsed
            .payload
            .as_deref()
            .map(is_pointer_payload)
            .unwrap_or(false);

        if parsed.level == 0 {
            let key = parsed
                .xref
                .clone()
                .unwrap_or_else(|| parsed.tag.clone());
            if doc.records_by_key.contains_key(&key) {
                let message = if parsed.xref.is_some() {
                    format!("duplicate cross-reference identifier {key}")
                } else {
                    format!("duplicate {key} record")
                };
                diagnostics.push(Diagnostic::new(
                    line_number,
                    DiagnosticCategory::StructuralSyntax,
                    message,
                ));
                continue;
            }
            if parsed.tag == "HEAD" && !doc.records.is_empty() {
                diagnostics.push(Diagnostic::new(
                    line_number,
                    DiagnosticCategory::StructuralSyntax,
                    "header must be the first record",
                ));
            }
            if parsed.tag != "HEAD" && doc.records.is_empty() {
                diagnostics.push(Diagnostic::new(
                    line_number,
                    DiagnosticCategory::StructuralSyntax,
                    "document must begin with a header",
                ));
            }
            if doc.records_by_key.contains_key("TRLR") {
                diagnostics.push(Diagnostic::new(
                    line_number,
                    DiagnosticCategory::StructuralSyntax,
                    "record appears after the trailer",
                ));
            }

            let schema = registry.resolve(version, &source, PARENT_RECORD, &parsed.tag, is_pointer);
            let id = doc.push_node(StructureNode {
                level: 0,
                xref: parsed.xref,
                tag: parsed.tag,
                payload: parsed.payload,
                line_number,
                original_text: raw.to_string(),
                schema,
                parent: None,
                children: Vec::new(),
            });
            path.clear();
            path.push(id);
            doc.records.push(id);
            doc.records_by_key.insert(key, id);
        } else {
            // Truncate before attachment: cousins explored at this depth
            // or deeper are gone for good.
            path.truncate(parsed.level);
            if path.len() < parsed.level {
                diagnostics.push(Diagnostic::new(
                    line_number,
                    DiagnosticCategory::StructuralSyntax,
                    format!("level {} has no parent at level {}", parsed.level, parsed.level - 1),
                ));
                continue;
            }
            let parent_id = path[parsed.level - 1];
            let parent_identity = doc.node(parent_id).schema.identity.clone();
            let schema =
                registry.resolve(version, &source, &parent_identity, &parsed.tag, is_pointer);
            let id = doc.push_node(StructureNode {
                level: parsed.level,
                xref: None,
                tag: parsed.tag,
                payload: parsed.payload,
                line_number,
                original_text: raw.to_string(),
                schema,
                parent: Some(parent_id),
                children: Vec::new(),
            });
            doc.node_mut(parent_id).children.push(id);
            path.push(id);

            // Header hooks that influence the rest of this same parse
            apply_header_hooks(registry, &mut doc, &mut diagnostics, id);
        }
    }

    debug!(
        version = %version,
        lines = doc.line_count,
        records = doc.records.len(),
        findings = diagnostics.len(),
        "document loaded"
    );
    (doc, diagnostics)
}

/// Recognize `HEAD.SOUR` (source product, the extension owner for schema
/// resolution) and `HEAD.SCHMA.TAG` (document-local tag definition,
/// registered so later lines in this very document can depend on it).
fn apply_header_hooks(
    registry: &mut SchemaRegistry,
    doc: &mut Document,
    diagnostics: &mut Vec<Diagnostic>,
    id: NodeId,
) {
    let path = doc.tag_path(id);
    if path == "HEAD.SOUR" {
        doc.source_product = doc.node(id).payload.clone();
        return;
    }
    if path != "HEAD.SCHMA.TAG" {
        return;
    }

    let node = doc.node(id);
    let tokens: Vec<&str> = node
        .payload
        .as_deref()
        .unwrap_or("")
        .split_whitespace()
        .collect();
    match tokens.as_slice() {
        [tag, identity] if tag.starts_with('_') => {
            let source = doc
                .source_product
                .clone()
                .unwrap_or_else(|| SOURCE_WILDCARD.to_string());
            registry.register_document_tag(doc.version, &source, tag, identity);
        }
        _ => {
            diagnostics.push(Diagnostic::new(
                node.line_number,
                DiagnosticCategory::PayloadFormat,
                "malformed tag definition, expected 'tag canonical-identity'",
            ));
        }
    }
}
