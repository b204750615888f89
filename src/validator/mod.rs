//! Validation engine
//!
//! Walks a document tree in pre-order enforcing placement rules,
//! substructure cardinality, and per-payload-type grammars. Findings
//! accumulate in document order; a single finding never aborts the walk.

use std::collections::HashMap;

use regex::Regex;
use tracing::debug;

use crate::document::{Document, NodeId};
use crate::error::{Diagnostic, DiagnosticCategory};
use crate::registry::SchemaRegistry;
use crate::schema::{is_extension_tag, PayloadType, LANGUAGE_PAYLOAD};
use crate::version::GedcomVersion;

mod date;
mod payload;

/// Payload grammar checker pluggable at run time, keyed by payload-type
/// token.
pub type PayloadParser = Box<dyn Fn(&str) -> bool>;

pub struct Validator<'r> {
    registry: &'r SchemaRegistry,
    version: GedcomVersion,
    media_re: Regex,
    custom: HashMap<String, PayloadParser>,
}

impl<'r> Validator<'r> {
    pub fn new(registry: &'r SchemaRegistry, version: GedcomVersion) -> Self {
        let mut custom: HashMap<String, PayloadParser> = HashMap::new();
        let language_re = Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{1,8})*$").unwrap();
        custom.insert(
            LANGUAGE_PAYLOAD.to_string(),
            Box::new(move |s| language_re.is_match(s)),
        );
        Self {
            registry,
            version,
            media_re: Regex::new(r"^-?[A-Za-z0-9.+]+/-?[A-Za-z0-9.+]+$").unwrap(),
            custom,
        }
    }

    /// Register a custom parser for a payload-type token with no built-in
    /// grammar, replacing any previous parser for that token.
    pub fn register_payload_parser(
        &mut self,
        token: impl Into<String>,
        parser: impl Fn(&str) -> bool + 'static,
    ) {
        self.custom.insert(token.into(), Box::new(parser));
    }

    /// Validate a whole document, returning findings in document order.
    pub fn validate(&self, doc: &Document) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for &record in doc.records() {
            let node = doc.node(record);
            if node.schema.documented && !node.schema.superstructures.is_empty() {
                diagnostics.push(Diagnostic::new(
                    node.line_number,
                    DiagnosticCategory::Placement,
                    format!("{} is not a record-level structure", node.tag),
                ));
            }
            self.validate_node(doc, record, &mut diagnostics);
        }

        if !doc.records().is_empty() && doc.record_by_key("TRLR").is_none() {
            diagnostics.push(Diagnostic::new(
                doc.line_count,
                DiagnosticCategory::Cardinality,
                "document is missing a trailer",
            ));
        }

        debug!(
            records = doc.records().len(),
            findings = diagnostics.len(),
            "validation finished"
        );
        diagnostics
    }

    fn validate_node(&self, doc: &Document, id: NodeId, diagnostics: &mut Vec<Diagnostic>) {
        self.check_payload(doc, id, diagnostics);
        self.check_cardinality(doc, id, diagnostics);
        for &child in doc.children(id) {
            self.check_placement(doc, child, id, diagnostics);
            self.validate_node(doc, child, diagnostics);
        }
    }

    /// A node may appear under its parent if any admission clause holds;
    /// anything else is a placement error.
    fn check_placement(
        &self,
        doc: &Document,
        child: NodeId,
        parent: NodeId,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let c = doc.node(child);
        let p = doc.node(parent);

        let admitted = c.schema.superstructures.contains_key(&p.schema.identity)
            || p.schema.substructures.contains_key(&c.schema.identity)
            // A standard structure relocated under an extension tag
            || (is_extension_tag(&c.tag) && c.schema.documented)
            || !c.schema.documented
            || !p.schema.documented
            // Inside an undocumented extension subtree no further placement
            // checking is possible
            || self.ancestry_has_extension(doc, parent)
            || (c.tag == "CONT" && p.schema.payload == PayloadType::Text);

        if !admitted {
            diagnostics.push(Diagnostic::new(
                c.line_number,
                DiagnosticCategory::Placement,
                format!("{} is not a valid substructure of {}", c.tag, p.tag),
            ));
        }
    }

    fn ancestry_has_extension(&self, doc: &Document, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(c) = cursor {
            if is_extension_tag(&doc.node(c).tag) {
                return true;
            }
            cursor = doc.parent(c);
        }
        false
    }

    /// Tally documented children by canonical identity and enforce the
    /// parent schema's cardinality rules.
    fn check_cardinality(&self, doc: &Document, id: NodeId, diagnostics: &mut Vec<Diagnostic>) {
        let node = doc.node(id);

        if matches!(node.tag.as_str(), "CONT" | "CONC" | "TRLR") && !doc.children(id).is_empty() {
            diagnostics.push(Diagnostic::new(
                node.line_number,
                DiagnosticCategory::Cardinality,
                format!("{} may not have substructures", node.tag),
            ));
        }

        let mut counts: HashMap<&str, u32> = HashMap::new();
        for &child in doc.children(id) {
            let schema = &doc.node(child).schema;
            if schema.documented {
                *counts.entry(schema.identity.as_str()).or_default() += 1;
            }
        }

        for (identity, rule) in &node.schema.substructures {
            let observed = counts.get(identity.as_str()).copied().unwrap_or(0);
            if rule.required() && observed == 0 {
                diagnostics.push(Diagnostic::new(
                    node.line_number,
                    DiagnosticCategory::Cardinality,
                    format!("{} is missing required substructure {identity}", node.tag),
                ));
            }
            if let Some(maximum) = rule.maximum() {
                if observed > maximum {
                    diagnostics.push(Diagnostic::new(
                        node.line_number,
                        DiagnosticCategory::Cardinality,
                        format!(
                            "{} has {observed} substructures of {identity}, maximum is {maximum}",
                            node.tag
                        ),
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::load_document;
    use crate::registry::builtin::standard_registry;

    fn check(lines: &[&str], version: GedcomVersion) -> Vec<Diagnostic> {
        let mut registry = SchemaRegistry::new();
        registry.load_all(version, &standard_registry()).unwrap();
        let (doc, parse_diags) = load_document(&mut registry, lines, Some(version));
        assert!(parse_diags.is_empty(), "parse diagnostics: {parse_diags:?}");
        let validator = Validator::new(&registry, version);
        validator.validate(&doc)
    }

    fn valid_doc(extra: &[&str]) -> Vec<String> {
        let mut lines = vec![
            "0 HEAD".to_string(),
            "1 GEDC".to_string(),
            "2 VERS 7.0".to_string(),
        ];
        lines.extend(extra.iter().map(|s| s.to_string()));
        lines.push("0 TRLR".to_string());
        lines
    }

    fn check70(extra: &[&str]) -> Vec<Diagnostic> {
        let lines = valid_doc(extra);
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        check(&refs, GedcomVersion::V70)
    }

    #[test]
    fn test_clean_document() {
        let diags = check70(&[
            "0 @I1@ INDI",
            "1 NAME John /Smith/",
            "2 GIVN John",
            "1 SEX M",
            "1 BIRT Y",
            "1 BIRT",
            "2 DATE 14 APR 1865",
            "3 TIME 10:30",
        ]);
        assert!(diags.is_empty(), "unexpected: {diags:?}");
    }

    #[test]
    fn test_missing_trailer() {
        let diags = check(
            &["0 HEAD", "1 GEDC", "2 VERS 7.0"],
            GedcomVersion::V70,
        );
        assert!(diags
            .iter()
            .any(|d| d.category == DiagnosticCategory::Cardinality
                && d.message.contains("missing a trailer")));
    }

    #[test]
    fn test_missing_required_substructure() {
        let diags = check(&["0 HEAD", "0 TRLR"], GedcomVersion::V70);
        let missing: Vec<_> = diags
            .iter()
            .filter(|d| d.message.contains("missing required substructure"))
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].line, 1);
        assert!(missing[0]
            .message
            .contains("https://gedcom.io/terms/v7/GEDC"));
    }

    #[test]
    fn test_too_many_substructures() {
        let diags = check70(&["0 @I1@ INDI", "1 SEX M", "1 SEX F"]);
        assert!(diags
            .iter()
            .any(|d| d.category == DiagnosticCategory::Cardinality
                && d.message.contains("maximum is 1")));
    }

    #[test]
    fn test_placement_error() {
        // GIVN is documented but INDI does not admit it directly
        let diags = check70(&["0 @I1@ INDI", "1 GIVN John"]);
        assert!(diags
            .iter()
            .any(|d| d.category == DiagnosticCategory::Placement
                && d.message.contains("GIVN is not a valid substructure of INDI")));
    }

    #[test]
    fn test_undocumented_extension_is_admitted() {
        let diags = check70(&["0 @I1@ INDI", "1 _UID 12345", "2 TYPE anything"]);
        assert!(
            diags.iter().all(|d| d.category != DiagnosticCategory::Placement),
            "unexpected: {diags:?}"
        );
    }

    #[test]
    fn test_relocated_standard_structure() {
        let diags = check70(&[
            "1 SCHMA",
            "2 TAG _SX https://gedcom.io/terms/v7/SEX",
            "0 @I1@ INDI",
            "1 BIRT",
            "2 _SX M",
        ]);
        // Relocated standard structure: no placement finding even though
        // BIRT does not admit SEX
        assert!(
            diags.iter().all(|d| d.category != DiagnosticCategory::Placement),
            "unexpected: {diags:?}"
        );
    }

    #[test]
    fn test_continuation_under_text_payload_only() {
        let ok = check70(&["0 @I1@ INDI", "1 NOTE line one", "2 CONT line two"]);
        assert!(ok.is_empty(), "unexpected: {ok:?}");

        let bad = check70(&["0 @I1@ INDI", "1 BIRT", "2 CONT stray"]);
        assert!(bad
            .iter()
            .any(|d| d.category == DiagnosticCategory::Placement
                && d.message.contains("CONT")));
    }

    #[test]
    fn test_continuation_forbids_children() {
        let diags = check70(&[
            "0 @I1@ INDI",
            "1 NOTE line one",
            "2 CONT line two",
            "3 CONT nested",
        ]);
        assert!(diags
            .iter()
            .any(|d| d.category == DiagnosticCategory::Cardinality
                && d.message.contains("CONT may not have substructures")));
    }

    #[test]
    fn test_custom_payload_parser_registration() {
        let mut registry = SchemaRegistry::new();
        registry
            .load_all(GedcomVersion::V70, &standard_registry())
            .unwrap();
        let lines = vec![
            "0 HEAD",
            "1 GEDC",
            "2 VERS 7.0",
            "1 LANG klingon",
            "0 TRLR",
        ];
        let (doc, _) = load_document(&mut registry, &lines, Some(GedcomVersion::V70));

        let validator = Validator::new(&registry, GedcomVersion::V70);
        assert!(validator
            .validate(&doc)
            .iter()
            .any(|d| d.category == DiagnosticCategory::PayloadFormat));

        let mut permissive = Validator::new(&registry, GedcomVersion::V70);
        permissive.register_payload_parser(LANGUAGE_PAYLOAD, |_| true);
        assert!(permissive.validate(&doc).is_empty());
    }
}
