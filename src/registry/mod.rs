//! Version-aware schema resolution registry
//!
//! Holds, per dialect, a resolvable mapping from
//! (source-extension-owner, parent-structure-identity, tag, pointer-flag)
//! to a structure schema, plus enumeration sets and calendar lookup tables.
//! Populated once per dialect from pre-parsed registry records; mutable
//! afterward, because document-local extension declarations are registered
//! while a document is still being read.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::{Result, SchemaLoadError};
use crate::schema::{
    CalendarSchema, CardinalityRule, EnumerationSet, PayloadType, StructureSchema,
};
use crate::version::GedcomVersion;

pub mod builtin;
pub mod records;

use records::RegistryData;

/// Wildcard source-owner under which standard structures register.
pub const SOURCE_WILDCARD: &str = "*";
/// Wildcard superstructure identity: a schema legal under any parent.
pub const PARENT_WILDCARD: &str = "*";
/// Parent key under which top-level record schemas register.
pub const PARENT_RECORD: &str = "";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SchemaKey {
    source: String,
    parent: String,
    tag: String,
    /// Only 5.5.1 keys differ by pointer-ness of the payload
    pointer: bool,
}

impl SchemaKey {
    fn new(source: &str, parent: &str, tag: &str, pointer: bool) -> Self {
        Self {
            source: source.to_string(),
            parent: parent.to_string(),
            tag: tag.to_string(),
            pointer,
        }
    }
}

#[derive(Default)]
struct VersionSchemas {
    schemas: HashMap<SchemaKey, Rc<StructureSchema>>,
    by_identity: HashMap<String, Rc<StructureSchema>>,
    /// Document-declared tag -> canonical identity
    aliases: HashMap<String, String>,
    enumerations: HashMap<String, EnumerationSet>,
    calendars: HashMap<String, Rc<CalendarSchema>>,
    loaded: bool,
}

/// The registry itself. Explicitly constructed and passed to loader,
/// validator, and comparator calls; never ambient global state.
#[derive(Default)]
pub struct SchemaRegistry {
    versions: HashMap<GedcomVersion, VersionSchemas>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self, version: GedcomVersion) -> bool {
        self.versions.get(&version).map(|v| v.loaded).unwrap_or(false)
    }

    /// Populate one dialect's schema map from pre-parsed registry records.
    ///
    /// Idempotent per dialect: a second load for an already-populated
    /// dialect is a no-op. Records whose identity does not apply to
    /// `version` are filtered out, and a structure is excluded entirely if
    /// any of its substructure keys is version-foreign.
    pub fn load_all(&mut self, version: GedcomVersion, data: &RegistryData) -> Result<()> {
        let slot = self.versions.entry(version).or_default();
        if slot.loaded {
            return Ok(());
        }

        // Short-tag lookup for resolving enumeration and month cross-references
        let mut tags_by_identity: HashMap<&str, &str> = HashMap::new();
        for rec in &data.structures {
            tags_by_identity.insert(rec.identity.as_str(), rec.standard_tag.as_str());
        }
        for month in &data.months {
            tags_by_identity.insert(month.identity.as_str(), month.standard_tag.as_str());
        }

        let mut registered = 0usize;
        for rec in &data.structures {
            if !version.identity_applies(&rec.identity) {
                continue;
            }
            if rec
                .substructures
                .keys()
                .any(|id| !version.identity_applies(id))
            {
                continue;
            }

            let mut substructures = std::collections::BTreeMap::new();
            for (child, token) in &rec.substructures {
                let rule = CardinalityRule::from_token(token).ok_or_else(|| {
                    SchemaLoadError::UnknownCardinality {
                        token: token.clone(),
                        identity: rec.identity.clone(),
                    }
                })?;
                substructures.insert(child.clone(), rule);
            }

            let mut superstructures = std::collections::BTreeMap::new();
            for (parent, token) in &rec.superstructures {
                if parent != PARENT_WILDCARD && !version.identity_applies(parent) {
                    continue;
                }
                let rule = CardinalityRule::from_token(token).ok_or_else(|| {
                    SchemaLoadError::UnknownCardinality {
                        token: token.clone(),
                        identity: rec.identity.clone(),
                    }
                })?;
                superstructures.insert(parent.clone(), rule);
            }

            let payload = PayloadType::from_token(rec.payload.as_deref());
            let pointer = version.distinguishes_pointer_payloads()
                && matches!(payload, PayloadType::Pointer(_));

            let schema = Rc::new(StructureSchema {
                standard_tag: rec.standard_tag.clone(),
                identity: rec.identity.clone(),
                payload,
                substructures,
                superstructures: superstructures.clone(),
                enumeration_set: rec.enumeration_set.clone(),
                documented: true,
            });

            if slot.by_identity.contains_key(&rec.identity) {
                return Err(SchemaLoadError::DuplicateIdentity(rec.identity.clone()));
            }
            slot.by_identity.insert(rec.identity.clone(), schema.clone());

            if superstructures.is_empty() {
                slot.schemas.insert(
                    SchemaKey::new(SOURCE_WILDCARD, PARENT_RECORD, &rec.standard_tag, pointer),
                    schema.clone(),
                );
            } else {
                for parent in superstructures.keys() {
                    slot.schemas.insert(
                        SchemaKey::new(SOURCE_WILDCARD, parent, &rec.standard_tag, pointer),
                        schema.clone(),
                    );
                }
            }
            registered += 1;
        }

        // Unambiguous standard tags also register under the wildcard parent:
        // a misplaced standard structure then still resolves to its
        // documented schema, which is what lets the validator flag the
        // placement instead of classifying the node as undocumented.
        let mut by_tag: HashMap<&str, Vec<Rc<StructureSchema>>> = HashMap::new();
        for schema in slot.by_identity.values() {
            by_tag
                .entry(schema.standard_tag.as_str())
                .or_default()
                .push(schema.clone());
        }
        for (tag, group) in by_tag {
            if let [schema] = group.as_slice() {
                slot.schemas
                    .entry(SchemaKey::new(SOURCE_WILDCARD, PARENT_WILDCARD, tag, false))
                    .or_insert_with(|| schema.clone());
            }
        }

        for en in &data.enumerations {
            if !version.identity_applies(&en.identity) {
                continue;
            }
            let members = en
                .members
                .iter()
                .map(|id| resolve_short_tag(&tags_by_identity, id))
                .collect();
            slot.enumerations.insert(
                en.identity.clone(),
                EnumerationSet {
                    identity: en.identity.clone(),
                    members,
                },
            );
        }

        for cal in &data.calendars {
            if !version.identity_applies(&cal.identity) {
                continue;
            }
            let mut months = Vec::with_capacity(cal.months.len());
            for month_id in &cal.months {
                let tag = tags_by_identity.get(month_id.as_str()).ok_or_else(|| {
                    SchemaLoadError::UnknownMonth {
                        calendar: cal.identity.clone(),
                        month: month_id.clone(),
                    }
                })?;
                months.push((*tag).to_string());
            }
            let schema = Rc::new(CalendarSchema {
                identity: cal.identity.clone(),
                standard_tag: cal.standard_tag.clone(),
                months,
                epochs: cal.epochs.clone(),
            });
            slot.calendars.insert(cal.standard_tag.clone(), schema);
        }

        slot.loaded = true;
        debug!(
            version = %version,
            structures = registered,
            enumerations = slot.enumerations.len(),
            calendars = slot.calendars.len(),
            "schema registry loaded"
        );
        Ok(())
    }

    /// Map a document-declared tag onto an already-known canonical identity.
    pub fn register_alias(&mut self, version: GedcomVersion, tag: &str, identity: &str) {
        let slot = self.versions.entry(version).or_default();
        trace!(version = %version, tag, identity, "registered tag alias");
        slot.aliases.insert(tag.to_string(), identity.to_string());
    }

    /// Register a minimal extension schema tied to a source owner,
    /// resolvable under any parent.
    pub fn register_schema(
        &mut self,
        version: GedcomVersion,
        source: &str,
        tag: &str,
        identity: &str,
    ) {
        let slot = self.versions.entry(version).or_default();
        let schema = Rc::new(StructureSchema::minimal(tag, identity));
        slot.by_identity.insert(identity.to_string(), schema.clone());
        slot.schemas
            .insert(SchemaKey::new(source, PARENT_WILDCARD, tag, false), schema);
        trace!(version = %version, source, tag, identity, "registered extension schema");
    }

    /// Handle one document-local `tag canonical-identity` declaration.
    /// A known identity makes the tag an alias; an unknown one creates a
    /// minimal schema.
    pub fn register_document_tag(
        &mut self,
        version: GedcomVersion,
        source: &str,
        tag: &str,
        identity: &str,
    ) {
        let known = self
            .versions
            .get(&version)
            .map(|v| v.by_identity.contains_key(identity))
            .unwrap_or(false);
        if known {
            self.register_alias(version, tag, identity);
        } else {
            self.register_schema(version, source, tag, identity);
        }
    }

    /// Multi-tier schema lookup, most-specific first. Never fails: the last
    /// tier synthesizes and caches an undocumented schema so a tree walk can
    /// always classify its node.
    pub fn resolve(
        &mut self,
        version: GedcomVersion,
        source: &str,
        parent_identity: &str,
        tag: &str,
        is_pointer: bool,
    ) -> Rc<StructureSchema> {
        let pointer = version.distinguishes_pointer_payloads() && is_pointer;
        let slot = self.versions.entry(version).or_default();

        // 1. Standard placement: wildcard source under the given parent
        if let Some(schema) = slot
            .schemas
            .get(&SchemaKey::new(SOURCE_WILDCARD, parent_identity, tag, pointer))
        {
            return schema.clone();
        }
        // 2. Documented extension tied to this source under the given parent
        if let Some(schema) = slot
            .schemas
            .get(&SchemaKey::new(source, parent_identity, tag, pointer))
        {
            return schema.clone();
        }
        // 3. Any-placement schemas: this source first, then standard
        for owner in [source, SOURCE_WILDCARD] {
            if let Some(schema) = slot
                .schemas
                .get(&SchemaKey::new(owner, PARENT_WILDCARD, tag, false))
            {
                return schema.clone();
            }
        }
        // 4. Document-declared alias redirecting to a canonical schema
        if let Some(identity) = slot.aliases.get(tag) {
            if let Some(schema) = slot.by_identity.get(identity) {
                return schema.clone();
            }
        }
        // 5. Synthesize, cache, and return an undocumented schema
        let key = SchemaKey::new(source, parent_identity, tag, false);
        if let Some(schema) = slot.schemas.get(&key) {
            return schema.clone();
        }
        trace!(version = %version, source, parent_identity, tag, "synthesized undocumented schema");
        let schema = Rc::new(StructureSchema::undocumented(tag));
        slot.schemas.insert(key, schema.clone());
        schema
    }

    pub fn schema_by_identity(
        &self,
        version: GedcomVersion,
        identity: &str,
    ) -> Option<Rc<StructureSchema>> {
        self.versions
            .get(&version)?
            .by_identity
            .get(identity)
            .cloned()
    }

    pub fn enumeration(&self, version: GedcomVersion, identity: &str) -> Option<&EnumerationSet> {
        self.versions.get(&version)?.enumerations.get(identity)
    }

    pub fn calendar(&self, version: GedcomVersion, tag: &str) -> Option<Rc<CalendarSchema>> {
        self.versions.get(&version)?.calendars.get(tag).cloned()
    }
}

fn resolve_short_tag(tags_by_identity: &HashMap<&str, &str>, identity: &str) -> String {
    if let Some(tag) = tags_by_identity.get(identity) {
        return (*tag).to_string();
    }
    // Fall back to the URI convention: last path segment, minus any
    // "enum-"-style prefix up to the final dash.
    let segment = identity.rsplit('/').next().unwrap_or(identity);
    match segment.rsplit_once('-') {
        Some((_, tail)) => tail.to_string(),
        None => segment.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::records::{EnumerationRecord, StructureRecord};
    use super::*;

    fn small_data() -> RegistryData {
        let mut head = StructureRecord {
            identity: "https://gedcom.io/terms/v7/HEAD".to_string(),
            standard_tag: "HEAD".to_string(),
            ..Default::default()
        };
        head.substructures.insert(
            "https://gedcom.io/terms/v7/GEDC".to_string(),
            "{1:1}".to_string(),
        );

        let mut gedc = StructureRecord {
            identity: "https://gedcom.io/terms/v7/GEDC".to_string(),
            standard_tag: "GEDC".to_string(),
            ..Default::default()
        };
        gedc.superstructures.insert(
            "https://gedcom.io/terms/v7/HEAD".to_string(),
            "{1:1}".to_string(),
        );

        let mut old_note = StructureRecord {
            identity: "https://gedcom.io/terms/v5.5.1/NOTE".to_string(),
            standard_tag: "NOTE".to_string(),
            payload: Some("http://www.w3.org/2001/XMLSchema#string".to_string()),
            ..Default::default()
        };
        old_note.superstructures.insert(
            "https://gedcom.io/terms/v5.5.1/INDI".to_string(),
            "{0:M}".to_string(),
        );

        RegistryData {
            structures: vec![head, gedc, old_note],
            enumerations: vec![EnumerationRecord {
                identity: "https://gedcom.io/terms/v7/enumset-SEX".to_string(),
                members: vec![
                    "https://gedcom.io/terms/v7/enum-M".to_string(),
                    "https://gedcom.io/terms/v7/enum-F".to_string(),
                ],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_load_filters_foreign_identities() {
        let mut registry = SchemaRegistry::new();
        registry.load_all(GedcomVersion::V70, &small_data()).unwrap();

        assert!(registry
            .schema_by_identity(GedcomVersion::V70, "https://gedcom.io/terms/v7/HEAD")
            .is_some());
        assert!(registry
            .schema_by_identity(GedcomVersion::V70, "https://gedcom.io/terms/v5.5.1/NOTE")
            .is_none());
    }

    #[test]
    fn test_load_is_idempotent() {
        let mut registry = SchemaRegistry::new();
        registry.load_all(GedcomVersion::V70, &small_data()).unwrap();
        // Second load with conflicting data is a no-op, not an error
        registry.load_all(GedcomVersion::V70, &small_data()).unwrap();
    }

    #[test]
    fn test_version_foreign_substructure_excludes_schema() {
        let mut rec = StructureRecord {
            identity: "https://gedcom.io/terms/v7/THING".to_string(),
            standard_tag: "THING".to_string(),
            ..Default::default()
        };
        rec.substructures.insert(
            "https://gedcom.io/terms/v7.1/ONLY".to_string(),
            "{0:1}".to_string(),
        );
        let data = RegistryData {
            structures: vec![rec],
            ..Default::default()
        };

        let mut registry = SchemaRegistry::new();
        registry.load_all(GedcomVersion::V70, &data).unwrap();
        assert!(registry
            .schema_by_identity(GedcomVersion::V70, "https://gedcom.io/terms/v7/THING")
            .is_none());

        let mut registry71 = SchemaRegistry::new();
        registry71.load_all(GedcomVersion::V71, &data).unwrap();
        assert!(registry71
            .schema_by_identity(GedcomVersion::V71, "https://gedcom.io/terms/v7/THING")
            .is_some());
    }

    #[test]
    fn test_bad_cardinality_token_is_fatal() {
        let mut rec = StructureRecord {
            identity: "https://gedcom.io/terms/v7/THING".to_string(),
            standard_tag: "THING".to_string(),
            ..Default::default()
        };
        rec.substructures.insert(
            "https://gedcom.io/terms/v7/GEDC".to_string(),
            "{2:7}".to_string(),
        );
        let data = RegistryData {
            structures: vec![rec],
            ..Default::default()
        };

        let mut registry = SchemaRegistry::new();
        let err = registry.load_all(GedcomVersion::V70, &data);
        assert!(matches!(
            err,
            Err(SchemaLoadError::UnknownCardinality { .. })
        ));
    }

    #[test]
    fn test_resolve_standard_then_alias_then_undocumented() {
        let mut registry = SchemaRegistry::new();
        registry.load_all(GedcomVersion::V70, &small_data()).unwrap();

        // Tier 1: standard placement
        let gedc = registry.resolve(
            GedcomVersion::V70,
            SOURCE_WILDCARD,
            "https://gedcom.io/terms/v7/HEAD",
            "GEDC",
            false,
        );
        assert!(gedc.documented);
        assert_eq!(gedc.identity, "https://gedcom.io/terms/v7/GEDC");

        // Tier 4: alias declared by a document
        registry.register_alias(GedcomVersion::V70, "_GEDC", "https://gedcom.io/terms/v7/GEDC");
        let aliased = registry.resolve(
            GedcomVersion::V70,
            SOURCE_WILDCARD,
            "anywhere",
            "_GEDC",
            false,
        );
        assert!(aliased.documented);
        assert!(Rc::ptr_eq(&aliased, &gedc));

        // Tier 5: undocumented synthesis is cached per (source, parent, tag)
        let first = registry.resolve(GedcomVersion::V70, "MyApp", "anywhere", "_XYZ", false);
        let second = registry.resolve(GedcomVersion::V70, "MyApp", "anywhere", "_XYZ", false);
        assert!(!first.documented);
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_enumeration_members_resolve_to_short_tags() {
        let mut registry = SchemaRegistry::new();
        registry.load_all(GedcomVersion::V70, &small_data()).unwrap();
        let set = registry
            .enumeration(GedcomVersion::V70, "https://gedcom.io/terms/v7/enumset-SEX")
            .unwrap();
        assert_eq!(set.members, vec!["M", "F"]);
    }
}
