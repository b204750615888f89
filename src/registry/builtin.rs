//! Built-in standard dataset
//!
//! A pre-parsed subset of the standard registry covering the header, record
//! and substructure set the toolkit exercises, for all three dialects. This
//! is the same hand-off shape an external registry-document loader would
//! produce; no registry document parsing happens here.

use super::records::{
    CalendarRecord, EnumerationRecord, MonthRecord, RegistryData, StructureRecord,
};
use crate::schema::LANGUAGE_PAYLOAD;

const TEXT: &str = "http://www.w3.org/2001/XMLSchema#string";
const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#nonNegativeInteger";
const BOOLEAN: &str = "Y|<NULL>";
const ENUM: &str = "https://gedcom.io/terms/v7/type-Enum";
const ENUM_LIST: &str = "https://gedcom.io/terms/v7/type-List#Enum";
const DATE_EXACT: &str = "https://gedcom.io/terms/v7/type-Date#exact";
const DATE_VALUE: &str = "https://gedcom.io/terms/v7/type-Date";
const TIME: &str = "https://gedcom.io/terms/v7/type-Time";
const AGE: &str = "https://gedcom.io/terms/v7/type-Age";
const NAME: &str = "https://gedcom.io/terms/v7/type-Name";
const MEDIA: &str = "http://www.w3.org/ns/dcat#mediaType";
const FILE_PATH: &str = "https://gedcom.io/terms/v7/type-FilePath";

fn v7(name: &str) -> String {
    format!("https://gedcom.io/terms/v7/{name}")
}

fn v551(name: &str) -> String {
    format!("https://gedcom.io/terms/v5.5.1/{name}")
}

fn pointer_to(identity: &str) -> String {
    format!("@<{identity}>@")
}

fn structure(
    identity: String,
    tag: &str,
    payload: Option<String>,
    supers: &[(String, &str)],
    subs: &[(String, &str)],
    enumeration_set: Option<String>,
) -> StructureRecord {
    StructureRecord {
        identity,
        standard_tag: tag.to_string(),
        label: None,
        payload,
        specification: Vec::new(),
        substructures: subs
            .iter()
            .map(|(id, card)| (id.clone(), (*card).to_string()))
            .collect(),
        superstructures: supers
            .iter()
            .map(|(id, card)| (id.clone(), (*card).to_string()))
            .collect(),
        enumeration_set,
    }
}

const MONTH_TAGS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// The complete built-in dataset; [`SchemaRegistry::load_all`] filters it by
/// dialect through the identity markers.
///
/// [`SchemaRegistry::load_all`]: super::SchemaRegistry::load_all
pub fn standard_registry() -> RegistryData {
    let mut data = RegistryData::default();

    for tag in MONTH_TAGS {
        data.months.push(MonthRecord {
            identity: v7(&format!("month-{tag}")),
            standard_tag: tag.to_string(),
        });
    }

    let month_ids: Vec<String> = MONTH_TAGS
        .iter()
        .map(|t| v7(&format!("month-{t}")))
        .collect();
    for (identity, tag) in [
        (v7("cal-GREGORIAN"), "GREGORIAN"),
        (v7("cal-JULIAN"), "JULIAN"),
        (v551("cal-GREGORIAN"), "GREGORIAN"),
        (v551("cal-JULIAN"), "JULIAN"),
    ] {
        data.calendars.push(CalendarRecord {
            identity,
            standard_tag: tag.to_string(),
            months: month_ids.clone(),
            epochs: vec!["BCE".to_string()],
        });
    }

    data.enumerations.push(EnumerationRecord {
        identity: v7("enumset-SEX"),
        members: vec![v7("enum-M"), v7("enum-F"), v7("enum-X"), v7("enum-U")],
    });
    data.enumerations.push(EnumerationRecord {
        identity: v7("enumset-RESN"),
        members: vec![
            v7("enum-CONFIDENTIAL"),
            v7("enum-LOCKED"),
            v7("enum-PRIVACY"),
        ],
    });
    data.enumerations.push(EnumerationRecord {
        identity: v551("enumset-SEX"),
        members: vec![v551("enum-M"), v551("enum-F"), v551("enum-U")],
    });

    push_v7_structures(&mut data);
    push_v551_structures(&mut data);
    data
}

fn push_v7_structures(data: &mut RegistryData) {
    let s = &mut data.structures;

    s.push(structure(
        v7("HEAD"),
        "HEAD",
        None,
        &[],
        &[
            (v7("GEDC"), "{1:1}"),
            (v7("SCHMA"), "{0:1}"),
            (v7("HEAD-SOUR"), "{0:1}"),
            (v7("HEAD-DEST"), "{0:1}"),
            (v7("HEAD-DATE"), "{0:1}"),
            (v7("HEAD-LANG"), "{0:1}"),
        ],
        None,
    ));
    s.push(structure(
        v7("GEDC"),
        "GEDC",
        None,
        &[(v7("HEAD"), "{1:1}")],
        &[(v7("GEDC-VERS"), "{1:1}")],
        None,
    ));
    s.push(structure(
        v7("GEDC-VERS"),
        "VERS",
        Some(TEXT.to_string()),
        &[(v7("GEDC"), "{1:1}")],
        &[],
        None,
    ));
    s.push(structure(
        v7("SCHMA"),
        "SCHMA",
        None,
        &[(v7("HEAD"), "{0:1}")],
        &[(v7("TAG"), "{0:M}")],
        None,
    ));
    s.push(structure(
        v7("TAG"),
        "TAG",
        Some(TEXT.to_string()),
        &[(v7("SCHMA"), "{0:M}")],
        &[],
        None,
    ));
    s.push(structure(
        v7("HEAD-SOUR"),
        "SOUR",
        Some(TEXT.to_string()),
        &[(v7("HEAD"), "{0:1}")],
        &[],
        None,
    ));
    s.push(structure(
        v7("HEAD-DEST"),
        "DEST",
        Some(TEXT.to_string()),
        &[(v7("HEAD"), "{0:1}")],
        &[],
        None,
    ));
    s.push(structure(
        v7("HEAD-DATE"),
        "DATE",
        Some(DATE_EXACT.to_string()),
        &[(v7("HEAD"), "{0:1}")],
        &[(v7("HEAD-DATE-TIME"), "{0:1}")],
        None,
    ));
    s.push(structure(
        v7("HEAD-DATE-TIME"),
        "TIME",
        Some(TIME.to_string()),
        &[(v7("HEAD-DATE"), "{0:1}")],
        &[],
        None,
    ));
    s.push(structure(
        v7("HEAD-LANG"),
        "LANG",
        Some(LANGUAGE_PAYLOAD.to_string()),
        &[(v7("HEAD"), "{0:1}")],
        &[],
        None,
    ));
    s.push(structure(v7("TRLR"), "TRLR", None, &[], &[], None));

    s.push(structure(
        v7("record-INDI"),
        "INDI",
        None,
        &[],
        &[
            (v7("INDI-NAME"), "{0:M}"),
            (v7("SEX"), "{0:1}"),
            (v7("RESN"), "{0:1}"),
            (v7("NCHI"), "{0:M}"),
            (v7("BIRT"), "{0:M}"),
            (v7("DEAT"), "{0:M}"),
            (v7("INDI-FAMC"), "{0:M}"),
            (v7("FAMS"), "{0:M}"),
            (v7("OBJE"), "{0:M}"),
            (v7("NOTE"), "{0:M}"),
            (v7("SNOTE"), "{0:M}"),
        ],
        None,
    ));

    let name_supers = [(v7("INDI-NAME"), "{0:M}")];
    s.push(structure(
        v7("INDI-NAME"),
        "NAME",
        Some(NAME.to_string()),
        &[(v7("record-INDI"), "{0:M}")],
        &[
            (v7("NPFX"), "{0:M}"),
            (v7("GIVN"), "{0:M}"),
            (v7("NICK"), "{0:M}"),
            (v7("SPFX"), "{0:M}"),
            (v7("SURN"), "{0:M}"),
            (v7("NSFX"), "{0:M}"),
            (v7("NOTE"), "{0:M}"),
            (v7("SNOTE"), "{0:M}"),
        ],
        None,
    ));
    for piece in ["NPFX", "GIVN", "NICK", "SPFX", "SURN", "NSFX"] {
        s.push(structure(
            v7(piece),
            piece,
            Some(TEXT.to_string()),
            &name_supers,
            &[],
            None,
        ));
    }

    s.push(structure(
        v7("SEX"),
        "SEX",
        Some(ENUM.to_string()),
        &[(v7("record-INDI"), "{0:1}")],
        &[],
        Some(v7("enumset-SEX")),
    ));
    s.push(structure(
        v7("RESN"),
        "RESN",
        Some(ENUM_LIST.to_string()),
        &[(v7("record-INDI"), "{0:1}")],
        &[],
        Some(v7("enumset-RESN")),
    ));
    s.push(structure(
        v7("NCHI"),
        "NCHI",
        Some(INTEGER.to_string()),
        &[(v7("record-INDI"), "{0:M}")],
        &[],
        None,
    ));

    let event_subs = [
        (v7("DATE"), "{0:1}"),
        (v7("PLAC"), "{0:1}"),
        (v7("AGE"), "{0:1}"),
        (v7("NOTE"), "{0:M}"),
        (v7("SNOTE"), "{0:M}"),
    ];
    s.push(structure(
        v7("BIRT"),
        "BIRT",
        Some(BOOLEAN.to_string()),
        &[(v7("record-INDI"), "{0:M}")],
        &event_subs,
        None,
    ));
    s.push(structure(
        v7("DEAT"),
        "DEAT",
        Some(BOOLEAN.to_string()),
        &[(v7("record-INDI"), "{0:M}")],
        &event_subs,
        None,
    ));
    s.push(structure(
        v7("MARR"),
        "MARR",
        Some(BOOLEAN.to_string()),
        &[(v7("record-FAM"), "{0:M}")],
        &event_subs,
        None,
    ));

    let event_supers = [
        (v7("BIRT"), "{0:1}"),
        (v7("DEAT"), "{0:1}"),
        (v7("MARR"), "{0:1}"),
    ];
    s.push(structure(
        v7("DATE"),
        "DATE",
        Some(DATE_VALUE.to_string()),
        &event_supers,
        &[(v7("TIME"), "{0:1}"), (v7("PHRASE"), "{0:1}")],
        None,
    ));
    s.push(structure(
        v7("TIME"),
        "TIME",
        Some(TIME.to_string()),
        &[(v7("DATE"), "{0:1}")],
        &[],
        None,
    ));
    s.push(structure(
        v7("PHRASE"),
        "PHRASE",
        Some(TEXT.to_string()),
        &[(v7("DATE"), "{0:1}")],
        &[],
        None,
    ));
    s.push(structure(
        v7("PLAC"),
        "PLAC",
        Some(TEXT.to_string()),
        &event_supers,
        &[],
        None,
    ));
    s.push(structure(
        v7("AGE"),
        "AGE",
        Some(AGE.to_string()),
        &event_supers,
        &[],
        None,
    ));

    let note_supers = [
        (v7("record-INDI"), "{0:M}"),
        (v7("record-FAM"), "{0:M}"),
        (v7("INDI-NAME"), "{0:M}"),
        (v7("BIRT"), "{0:M}"),
        (v7("DEAT"), "{0:M}"),
        (v7("MARR"), "{0:M}"),
    ];
    s.push(structure(
        v7("NOTE"),
        "NOTE",
        Some(TEXT.to_string()),
        &note_supers,
        &[(v7("MIME"), "{0:1}"), (v7("LANG"), "{0:1}")],
        None,
    ));
    s.push(structure(
        v7("SNOTE"),
        "SNOTE",
        Some(pointer_to(&v7("record-SNOTE"))),
        &note_supers,
        &[],
        None,
    ));
    s.push(structure(
        v7("record-SNOTE"),
        "SNOTE",
        Some(TEXT.to_string()),
        &[],
        &[(v7("MIME"), "{0:1}"), (v7("LANG"), "{0:1}")],
        None,
    ));
    let note_like_supers = [(v7("NOTE"), "{0:1}"), (v7("record-SNOTE"), "{0:1}")];
    s.push(structure(
        v7("MIME"),
        "MIME",
        Some(MEDIA.to_string()),
        &note_like_supers,
        &[],
        None,
    ));
    s.push(structure(
        v7("LANG"),
        "LANG",
        Some(LANGUAGE_PAYLOAD.to_string()),
        &note_like_supers,
        &[],
        None,
    ));

    s.push(structure(
        v7("INDI-FAMC"),
        "FAMC",
        Some(pointer_to(&v7("record-FAM"))),
        &[(v7("record-INDI"), "{0:M}")],
        &[],
        None,
    ));
    s.push(structure(
        v7("FAMS"),
        "FAMS",
        Some(pointer_to(&v7("record-FAM"))),
        &[(v7("record-INDI"), "{0:M}")],
        &[],
        None,
    ));

    s.push(structure(
        v7("record-FAM"),
        "FAM",
        None,
        &[],
        &[
            (v7("HUSB"), "{0:1}"),
            (v7("WIFE"), "{0:1}"),
            (v7("CHIL"), "{0:M}"),
            (v7("MARR"), "{0:M}"),
            (v7("NOTE"), "{0:M}"),
            (v7("SNOTE"), "{0:M}"),
        ],
        None,
    ));
    s.push(structure(
        v7("HUSB"),
        "HUSB",
        Some(pointer_to(&v7("record-INDI"))),
        &[(v7("record-FAM"), "{0:1}")],
        &[],
        None,
    ));
    s.push(structure(
        v7("WIFE"),
        "WIFE",
        Some(pointer_to(&v7("record-INDI"))),
        &[(v7("record-FAM"), "{0:1}")],
        &[],
        None,
    ));
    s.push(structure(
        v7("CHIL"),
        "CHIL",
        Some(pointer_to(&v7("record-INDI"))),
        &[(v7("record-FAM"), "{0:M}")],
        &[],
        None,
    ));

    s.push(structure(
        v7("record-OBJE"),
        "OBJE",
        None,
        &[],
        &[(v7("FILE"), "{1:M}")],
        None,
    ));
    s.push(structure(
        v7("OBJE"),
        "OBJE",
        Some(pointer_to(&v7("record-OBJE"))),
        &[(v7("record-INDI"), "{0:M}")],
        &[],
        None,
    ));
    s.push(structure(
        v7("FILE"),
        "FILE",
        Some(FILE_PATH.to_string()),
        &[(v7("record-OBJE"), "{1:M}")],
        &[(v7("FORM"), "{1:1}")],
        None,
    ));
    s.push(structure(
        v7("FORM"),
        "FORM",
        Some(MEDIA.to_string()),
        &[(v7("FILE"), "{1:1}")],
        &[],
        None,
    ));

    // Line continuation: legal under any string-payload parent
    s.push(structure(
        v7("CONT"),
        "CONT",
        Some(TEXT.to_string()),
        &[(super::PARENT_WILDCARD.to_string(), "{0:M}")],
        &[],
        None,
    ));
}

fn push_v551_structures(data: &mut RegistryData) {
    let s = &mut data.structures;

    s.push(structure(
        v551("HEAD"),
        "HEAD",
        None,
        &[],
        &[
            (v551("GEDC"), "{1:1}"),
            (v551("HEAD-SOUR"), "{0:1}"),
            (v551("HEAD-DEST"), "{0:1}"),
            (v551("HEAD-DATE"), "{0:1}"),
        ],
        None,
    ));
    s.push(structure(
        v551("GEDC"),
        "GEDC",
        None,
        &[(v551("HEAD"), "{1:1}")],
        &[(v551("GEDC-VERS"), "{1:1}")],
        None,
    ));
    s.push(structure(
        v551("GEDC-VERS"),
        "VERS",
        Some(TEXT.to_string()),
        &[(v551("GEDC"), "{1:1}")],
        &[],
        None,
    ));
    s.push(structure(
        v551("HEAD-SOUR"),
        "SOUR",
        Some(TEXT.to_string()),
        &[(v551("HEAD"), "{0:1}")],
        &[],
        None,
    ));
    s.push(structure(
        v551("HEAD-DEST"),
        "DEST",
        Some(TEXT.to_string()),
        &[(v551("HEAD"), "{0:1}")],
        &[],
        None,
    ));
    s.push(structure(
        v551("HEAD-DATE"),
        "DATE",
        Some(DATE_EXACT.to_string()),
        &[(v551("HEAD"), "{0:1}")],
        &[(v551("HEAD-DATE-TIME"), "{0:1}")],
        None,
    ));
    s.push(structure(
        v551("HEAD-DATE-TIME"),
        "TIME",
        Some(TIME.to_string()),
        &[(v551("HEAD-DATE"), "{0:1}")],
        &[],
        None,
    ));
    s.push(structure(v551("TRLR"), "TRLR", None, &[], &[], None));

    s.push(structure(
        v551("record-INDI"),
        "INDI",
        None,
        &[],
        &[
            (v551("INDI-NAME"), "{0:M}"),
            (v551("SEX"), "{0:1}"),
            (v551("BIRT"), "{0:M}"),
            (v551("DEAT"), "{0:M}"),
            (v551("INDI-FAMC"), "{0:M}"),
            (v551("FAMS"), "{0:M}"),
            (v551("NOTE"), "{0:M}"),
            (v551("NOTE-pointer"), "{0:M}"),
        ],
        None,
    ));
    s.push(structure(
        v551("INDI-NAME"),
        "NAME",
        Some(NAME.to_string()),
        &[(v551("record-INDI"), "{0:M}")],
        &[
            (v551("NPFX"), "{0:1}"),
            (v551("GIVN"), "{0:1}"),
            (v551("NICK"), "{0:1}"),
            (v551("SPFX"), "{0:1}"),
            (v551("SURN"), "{0:1}"),
            (v551("NSFX"), "{0:1}"),
            (v551("NOTE"), "{0:M}"),
            (v551("NOTE-pointer"), "{0:M}"),
        ],
        None,
    ));
    for piece in ["NPFX", "GIVN", "NICK", "SPFX", "SURN", "NSFX"] {
        s.push(structure(
            v551(piece),
            piece,
            Some(TEXT.to_string()),
            &[(v551("INDI-NAME"), "{0:1}")],
            &[],
            None,
        ));
    }
    s.push(structure(
        v551("SEX"),
        "SEX",
        Some(ENUM.to_string()),
        &[(v551("record-INDI"), "{0:1}")],
        &[],
        Some(v551("enumset-SEX")),
    ));

    let event_subs = [
        (v551("DATE"), "{0:1}"),
        (v551("PLAC"), "{0:1}"),
        (v551("AGE"), "{0:1}"),
        (v551("NOTE"), "{0:M}"),
        (v551("NOTE-pointer"), "{0:M}"),
    ];
    s.push(structure(
        v551("BIRT"),
        "BIRT",
        Some(BOOLEAN.to_string()),
        &[(v551("record-INDI"), "{0:M}")],
        &event_subs,
        None,
    ));
    s.push(structure(
        v551("DEAT"),
        "DEAT",
        Some(BOOLEAN.to_string()),
        &[(v551("record-INDI"), "{0:M}")],
        &event_subs,
        None,
    ));
    s.push(structure(
        v551("MARR"),
        "MARR",
        Some(BOOLEAN.to_string()),
        &[(v551("record-FAM"), "{0:M}")],
        &event_subs,
        None,
    ));

    let event_supers = [
        (v551("BIRT"), "{0:1}"),
        (v551("DEAT"), "{0:1}"),
        (v551("MARR"), "{0:1}"),
    ];
    s.push(structure(
        v551("DATE"),
        "DATE",
        Some(DATE_VALUE.to_string()),
        &event_supers,
        &[],
        None,
    ));
    s.push(structure(
        v551("PLAC"),
        "PLAC",
        Some(TEXT.to_string()),
        &event_supers,
        &[],
        None,
    ));
    s.push(structure(
        v551("AGE"),
        "AGE",
        Some(AGE.to_string()),
        &event_supers,
        &[],
        None,
    ));

    // 5.5.1 resolves NOTE differently for pointer and non-pointer payloads
    let note_supers = [
        (v551("record-INDI"), "{0:M}"),
        (v551("record-FAM"), "{0:M}"),
        (v551("INDI-NAME"), "{0:M}"),
        (v551("BIRT"), "{0:M}"),
        (v551("DEAT"), "{0:M}"),
        (v551("MARR"), "{0:M}"),
    ];
    s.push(structure(
        v551("NOTE"),
        "NOTE",
        Some(TEXT.to_string()),
        &note_supers,
        &[],
        None,
    ));
    s.push(structure(
        v551("NOTE-pointer"),
        "NOTE",
        Some(pointer_to(&v551("record-NOTE"))),
        &note_supers,
        &[],
        None,
    ));
    s.push(structure(
        v551("record-NOTE"),
        "NOTE",
        Some(TEXT.to_string()),
        &[],
        &[],
        None,
    ));

    s.push(structure(
        v551("INDI-FAMC"),
        "FAMC",
        Some(pointer_to(&v551("record-FAM"))),
        &[(v551("record-INDI"), "{0:M}")],
        &[],
        None,
    ));
    s.push(structure(
        v551("FAMS"),
        "FAMS",
        Some(pointer_to(&v551("record-FAM"))),
        &[(v551("record-INDI"), "{0:M}")],
        &[],
        None,
    ));
    s.push(structure(
        v551("record-FAM"),
        "FAM",
        None,
        &[],
        &[
            (v551("HUSB"), "{0:1}"),
            (v551("WIFE"), "{0:1}"),
            (v551("CHIL"), "{0:M}"),
            (v551("MARR"), "{0:M}"),
            (v551("NOTE"), "{0:M}"),
            (v551("NOTE-pointer"), "{0:M}"),
        ],
        None,
    ));
    s.push(structure(
        v551("HUSB"),
        "HUSB",
        Some(pointer_to(&v551("record-INDI"))),
        &[(v551("record-FAM"), "{0:1}")],
        &[],
        None,
    ));
    s.push(structure(
        v551("WIFE"),
        "WIFE",
        Some(pointer_to(&v551("record-INDI"))),
        &[(v551("record-FAM"), "{0:1}")],
        &[],
        None,
    ));
    s.push(structure(
        v551("CHIL"),
        "CHIL",
        Some(pointer_to(&v551("record-INDI"))),
        &[(v551("record-FAM"), "{0:M}")],
        &[],
        None,
    ));

    s.push(structure(
        v551("CONT"),
        "CONT",
        Some(TEXT.to_string()),
        &[(super::PARENT_WILDCARD.to_string(), "{0:M}")],
        &[],
        None,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{SchemaRegistry, PARENT_RECORD, SOURCE_WILDCARD};
    use crate::schema::PayloadType;
    use crate::version::GedcomVersion;

    #[test]
    fn test_loads_for_all_dialects() {
        let data = standard_registry();
        let mut registry = SchemaRegistry::new();
        for version in [GedcomVersion::V551, GedcomVersion::V70, GedcomVersion::V71] {
            registry.load_all(version, &data).unwrap();
            let head = registry.resolve(version, SOURCE_WILDCARD, PARENT_RECORD, "HEAD", false);
            assert!(head.documented, "HEAD must be documented for {version}");
        }
    }

    #[test]
    fn test_551_note_pointer_flag_selects_schema() {
        let data = standard_registry();
        let mut registry = SchemaRegistry::new();
        registry.load_all(GedcomVersion::V551, &data).unwrap();

        let indi = registry.resolve(
            GedcomVersion::V551,
            SOURCE_WILDCARD,
            PARENT_RECORD,
            "INDI",
            false,
        );
        let inline = registry.resolve(
            GedcomVersion::V551,
            SOURCE_WILDCARD,
            &indi.identity,
            "NOTE",
            false,
        );
        let by_ref = registry.resolve(
            GedcomVersion::V551,
            SOURCE_WILDCARD,
            &indi.identity,
            "NOTE",
            true,
        );
        assert_eq!(inline.payload, PayloadType::Text);
        assert!(matches!(by_ref.payload, PayloadType::Pointer(_)));
        assert_ne!(inline.identity, by_ref.identity);
    }

    #[test]
    fn test_70_ignores_pointer_flag() {
        let data = standard_registry();
        let mut registry = SchemaRegistry::new();
        registry.load_all(GedcomVersion::V70, &data).unwrap();

        let indi = registry.resolve(
            GedcomVersion::V70,
            SOURCE_WILDCARD,
            PARENT_RECORD,
            "INDI",
            false,
        );
        let a = registry.resolve(
            GedcomVersion::V70,
            SOURCE_WILDCARD,
            &indi.identity,
            "NOTE",
            false,
        );
        let b = registry.resolve(
            GedcomVersion::V70,
            SOURCE_WILDCARD,
            &indi.identity,
            "NOTE",
            true,
        );
        assert_eq!(a.identity, b.identity);
    }

    #[test]
    fn test_continuation_resolves_under_any_parent() {
        let data = standard_registry();
        let mut registry = SchemaRegistry::new();
        registry.load_all(GedcomVersion::V70, &data).unwrap();

        let cont = registry.resolve(
            GedcomVersion::V70,
            SOURCE_WILDCARD,
            "https://gedcom.io/terms/v7/NOTE",
            "CONT",
            false,
        );
        assert!(cont.documented);
        assert_eq!(cont.identity, "https://gedcom.io/terms/v7/CONT");
    }
}
