//! Payload grammar dispatch
//!
//! Grammars are selected by the resolved schema's payload type: built-in
//! categories are a closed tagged set, and anything else goes through the
//! validator's registered-parser map.

use url::{ParseError, Url};

use super::{date, Validator};
use crate::document::{is_pointer_payload, Document, NodeId};
use crate::error::{Diagnostic, DiagnosticCategory};
use crate::schema::{is_extension_tag, PayloadType};

/// The sentinel pointer with no target
const VOID_POINTER: &str = "@VOID@";

/// Subtypes permitted by the MIME structure's restricted sub-rule
const RESTRICTED_MEDIA: [&str; 2] = ["text/plain", "text/html"];

impl Validator<'_> {
    pub(super) fn check_payload(
        &self,
        doc: &Document,
        id: NodeId,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let node = doc.node(id);
        // Line continuations carry fragments of the parent's payload and are
        // exempt from payload grammar
        if matches!(node.tag.as_str(), "CONT" | "CONC") {
            return;
        }
        if !node.schema.documented {
            return;
        }

        let line = node.line_number;
        let payload = node.payload.as_deref();

        if node.schema.payload == PayloadType::Null {
            if payload.is_some() {
                diagnostics.push(Diagnostic::new(
                    line,
                    DiagnosticCategory::PayloadFormat,
                    format!("{} must not carry a payload", node.tag),
                ));
            }
            return;
        }
        if node.schema.payload == PayloadType::Boolean {
            if !matches!(payload, None | Some("Y")) {
                diagnostics.push(Diagnostic::new(
                    line,
                    DiagnosticCategory::PayloadFormat,
                    format!("{} payload must be 'Y' or absent", node.tag),
                ));
            }
            return;
        }
        if node.schema.payload == PayloadType::Text {
            return;
        }

        let Some(payload) = payload else {
            diagnostics.push(Diagnostic::new(
                line,
                DiagnosticCategory::PayloadFormat,
                format!("{} requires a payload", node.tag),
            ));
            return;
        };

        match &node.schema.payload {
            PayloadType::NonNegativeInteger => {
                if payload.parse::<u64>().is_err() {
                    diagnostics.push(Diagnostic::new(
                        line,
                        DiagnosticCategory::PayloadFormat,
                        format!("'{payload}' is not a non-negative integer"),
                    ));
                }
            }
            PayloadType::Enumeration => {
                self.check_enum_token(doc, id, payload, diagnostics);
            }
            PayloadType::EnumerationList => {
                for token in payload.split(',') {
                    self.check_enum_token(doc, id, token.trim(), diagnostics);
                }
            }
            PayloadType::DateExact => {
                if let Err(reason) = date::check_date_exact(self.registry, self.version, payload) {
                    diagnostics.push(Diagnostic::new(
                        line,
                        DiagnosticCategory::PayloadFormat,
                        reason,
                    ));
                }
            }
            PayloadType::DateValue => {
                if let Err(reason) = date::check_date_value(self.registry, self.version, payload) {
                    diagnostics.push(Diagnostic::new(
                        line,
                        DiagnosticCategory::PayloadFormat,
                        reason,
                    ));
                }
            }
            PayloadType::DatePeriod => {
                if let Err(reason) = date::check_date_period(self.registry, self.version, payload) {
                    diagnostics.push(Diagnostic::new(
                        line,
                        DiagnosticCategory::PayloadFormat,
                        reason,
                    ));
                }
            }
            PayloadType::Time => {
                if let Err(reason) = date::check_time(payload) {
                    diagnostics.push(Diagnostic::new(
                        line,
                        DiagnosticCategory::PayloadFormat,
                        reason,
                    ));
                }
            }
            PayloadType::Age => {
                if let Err(reason) = date::check_age(self.version, payload) {
                    diagnostics.push(Diagnostic::new(
                        line,
                        DiagnosticCategory::PayloadFormat,
                        reason,
                    ));
                }
            }
            PayloadType::PersonalName => {
                let slashes = payload.chars().filter(|&c| c == '/').count();
                let printable = payload.chars().all(|c| !c.is_control());
                if !printable || (slashes != 0 && slashes != 2) {
                    diagnostics.push(Diagnostic::new(
                        line,
                        DiagnosticCategory::PayloadFormat,
                        format!("'{payload}' is not a personal name"),
                    ));
                }
            }
            PayloadType::MediaType => {
                if !self.media_re.is_match(payload) {
                    diagnostics.push(Diagnostic::new(
                        line,
                        DiagnosticCategory::PayloadFormat,
                        format!("'{payload}' is not a media type"),
                    ));
                } else if node.tag == "MIME" && !RESTRICTED_MEDIA.contains(&payload) {
                    diagnostics.push(Diagnostic::new(
                        line,
                        DiagnosticCategory::PayloadFormat,
                        format!("'{payload}' is not a permitted note media type"),
                    ));
                }
            }
            PayloadType::FilePath => {
                let well_formed = match Url::parse(payload) {
                    Ok(_) => true,
                    // A relative reference: syntactically plausible when it
                    // has no whitespace or control characters
                    Err(ParseError::RelativeUrlWithoutBase) => payload
                        .chars()
                        .all(|c| !c.is_whitespace() && !c.is_control()),
                    Err(_) => false,
                };
                if !well_formed {
                    diagnostics.push(Diagnostic::new(
                        line,
                        DiagnosticCategory::PayloadFormat,
                        format!("'{payload}' is not a well-formed reference"),
                    ));
                }
            }
            PayloadType::Pointer(target_identity) => {
                self.check_pointer(doc, id, payload, target_identity, diagnostics);
            }
            PayloadType::Custom(token) => match self.custom.get(token) {
                Some(parser) => {
                    if !parser(payload) {
                        diagnostics.push(Diagnostic::new(
                            line,
                            DiagnosticCategory::PayloadFormat,
                            format!("'{payload}' does not satisfy payload type {token}"),
                        ));
                    }
                }
                None => {
                    diagnostics.push(Diagnostic::new(
                        line,
                        DiagnosticCategory::Internal,
                        format!("unrecognized payload type {token}"),
                    ));
                }
            },
            // Handled above
            PayloadType::Null | PayloadType::Boolean | PayloadType::Text => {}
        }
    }

    fn check_enum_token(
        &self,
        doc: &Document,
        id: NodeId,
        token: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        // Document-local extension values are exempt
        if is_extension_tag(token) {
            return;
        }
        let node = doc.node(id);
        let Some(set_identity) = node.schema.enumeration_set.as_deref() else {
            diagnostics.push(Diagnostic::new(
                node.line_number,
                DiagnosticCategory::Internal,
                format!("{} has an enumerated payload but no enumeration set", node.tag),
            ));
            return;
        };
        let Some(set) = self.registry.enumeration(self.version, set_identity) else {
            diagnostics.push(Diagnostic::new(
                node.line_number,
                DiagnosticCategory::Internal,
                format!("enumeration set {set_identity} is not loaded"),
            ));
            return;
        };
        if !set.contains(token) {
            diagnostics.push(Diagnostic::new(
                node.line_number,
                DiagnosticCategory::PayloadFormat,
                format!("'{token}' is not a value of {set_identity}"),
            ));
        }
    }

    fn check_pointer(
        &self,
        doc: &Document,
        id: NodeId,
        payload: &str,
        target_identity: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let node = doc.node(id);
        if !is_pointer_payload(payload) {
            diagnostics.push(Diagnostic::new(
                node.line_number,
                DiagnosticCategory::PayloadFormat,
                format!("{} payload '{payload}' is not a pointer", node.tag),
            ));
            return;
        }
        if payload == VOID_POINTER {
            return;
        }
        match doc.record_by_key(payload) {
            None => {
                diagnostics.push(Diagnostic::new(
                    node.line_number,
                    DiagnosticCategory::UnresolvedPointer,
                    format!("pointer {payload} has no target record"),
                ));
            }
            Some(target) => {
                let actual = &doc.node(target).schema.identity;
                if actual != target_identity {
                    diagnostics.push(Diagnostic::new(
                        node.line_number,
                        DiagnosticCategory::UnresolvedPointer,
                        format!(
                            "pointer {payload} targets {actual}, expected {target_identity}"
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
    use crate::registry::SchemaRegistry;
    use crate::version::GedcomVersion;

    fn check70(extra: &[&str]) -> Vec<Diagnostic> {
        let mut lines = vec!["0 HEAD", "1 GEDC", "2 VERS 7.0"];
        lines.extend_from_slice(extra);
        lines.push("0 TRLR");

        let mut registry = SchemaRegistry::new();
        registry
            .load_all(GedcomVersion::V70, &standard_registry())
            .unwrap();
        let (doc, parse) = load_document(&mut registry, &lines, Some(GedcomVersion::V70));
        assert!(parse.is_empty(), "parse diagnostics: {parse:?}");
        Validator::new(&registry, GedcomVersion::V70).validate(&doc)
    }

    fn payload_findings(extra: &[&str]) -> Vec<Diagnostic> {
        check70(extra)
            .into_iter()
            .filter(|d| {
                matches!(
                    d.category,
                    DiagnosticCategory::PayloadFormat | DiagnosticCategory::UnresolvedPointer
                )
            })
            .collect()
    }

    #[test]
    fn test_null_payload() {
        let diags = payload_findings(&["0 @I1@ INDI", "1 BIRT", "2 DATE 1900", "3 PHRASE said so"]);
        assert!(diags.is_empty(), "unexpected: {diags:?}");

        let diags = payload_findings(&["1 GEDC oops"]);
        assert!(diags.iter().any(|d| d.message.contains("must not carry")));
    }

    #[test]
    fn test_boolean_payload() {
        assert!(payload_findings(&["0 @I1@ INDI", "1 BIRT Y"]).is_empty());
        assert!(payload_findings(&["0 @I1@ INDI", "1 BIRT"]).is_empty());
        let diags = payload_findings(&["0 @I1@ INDI", "1 BIRT yes"]);
        assert!(diags.iter().any(|d| d.message.contains("'Y' or absent")));
    }

    #[test]
    fn test_integer_payload() {
        assert!(payload_findings(&["0 @I1@ INDI", "1 NCHI 3"]).is_empty());
        let diags = payload_findings(&["0 @I1@ INDI", "1 NCHI three"]);
        assert!(!diags.is_empty());
    }

    #[test]
    fn test_enum_payloads() {
        assert!(payload_findings(&["0 @I1@ INDI", "1 SEX M"]).is_empty());
        assert!(payload_findings(&["0 @I1@ INDI", "1 SEX _OTHER"]).is_empty());
        assert!(!payload_findings(&["0 @I1@ INDI", "1 SEX male"]).is_empty());

        assert!(payload_findings(&["0 @I1@ INDI", "1 RESN CONFIDENTIAL, LOCKED"]).is_empty());
        assert!(!payload_findings(&["0 @I1@ INDI", "1 RESN CONFIDENTIAL, SECRET"]).is_empty());
    }

    #[test]
    fn test_media_type_and_mime_restriction() {
        assert!(payload_findings(&[
            "0 @I1@ INDI",
            "1 NOTE hello",
            "2 MIME text/plain",
        ])
        .is_empty());

        let diags = payload_findings(&["0 @I1@ INDI", "1 NOTE hello", "2 MIME text"]);
        assert!(diags.iter().any(|d| d.message.contains("not a media type")));

        // Well-formed media type, but outside the restricted note set
        let diags = payload_findings(&["0 @I1@ INDI", "1 NOTE hello", "2 MIME image/png"]);
        assert!(diags
            .iter()
            .any(|d| d.message.contains("not a permitted note media type")));
    }

    #[test]
    fn test_file_path() {
        assert!(payload_findings(&[
            "0 @O1@ OBJE",
            "1 FILE https://example.com/a.jpg",
            "2 FORM image/jpeg",
        ])
        .is_empty());
        assert!(payload_findings(&[
            "0 @O1@ OBJE",
            "1 FILE media/portrait.jpg",
            "2 FORM image/jpeg",
        ])
        .is_empty());
        let diags = payload_findings(&[
            "0 @O1@ OBJE",
            "1 FILE bad path.jpg",
            "2 FORM image/jpeg",
        ]);
        assert!(diags
            .iter()
            .any(|d| d.message.contains("well-formed reference")));
    }

    #[test]
    fn test_pointer_resolution() {
        assert!(payload_findings(&[
            "0 @I1@ INDI",
            "1 FAMS @F1@",
            "0 @F1@ FAM",
            "1 HUSB @I1@",
        ])
        .is_empty());
        assert!(payload_findings(&["0 @I1@ INDI", "1 FAMS @VOID@"]).is_empty());

        let diags = payload_findings(&["0 @I1@ INDI", "1 FAMS @F9@"]);
        assert!(diags
            .iter()
            .any(|d| d.category == DiagnosticCategory::UnresolvedPointer
                && d.message.contains("no target record")));

        // Resolves, but to the wrong record type
        let diags = payload_findings(&["0 @I1@ INDI", "1 FAMS @I2@", "0 @I2@ INDI"]);
        assert!(diags
            .iter()
            .any(|d| d.category == DiagnosticCategory::UnresolvedPointer
                && d.message.contains("expected")));

        let diags = payload_findings(&["0 @I1@ INDI", "1 FAMS nowhere"]);
        assert!(diags.iter().any(|d| d.message.contains("is not a pointer")));
    }

    #[test]
    fn test_personal_name() {
        assert!(payload_findings(&["0 @I1@ INDI", "1 NAME John /Smith/ Jr"]).is_empty());
        assert!(payload_findings(&["0 @I1@ INDI", "1 NAME Madonna"]).is_empty());
        let diags = payload_findings(&["0 @I1@ INDI", "1 NAME John /Smith"]);
        assert!(diags.iter().any(|d| d.message.contains("personal name")));
    }
}
