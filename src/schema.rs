//! Structure schemas, cardinality rules, and payload types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Payload type token carried by language-typed structures; handled through
/// the validator's registered-parser map rather than a built-in grammar.
pub const LANGUAGE_PAYLOAD: &str = "http://www.w3.org/2001/XMLSchema#Language";

/// How many substructures of one identity may or must appear under a parent.
///
/// Registry documents express these as the five literal tokens
/// `{0:1}`, `{1:1}`, `{0:M}`, `{1:M}`, `{0:3}`; each maps to one unique
/// (required, maximum) pair and back to the identical token string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardinalityRule {
    /// `{0:1}` - not required, at most one
    ZeroToOne,
    /// `{1:1}` - required, exactly one
    One,
    /// `{0:M}` - not required, unbounded
    ZeroToMany,
    /// `{1:M}` - required, unbounded
    OneToMany,
    /// `{0:3}` - not required, at most three
    ZeroToThree,
}

impl CardinalityRule {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "{0:1}" => Some(CardinalityRule::ZeroToOne),
            "{1:1}" => Some(CardinalityRule::One),
            "{0:M}" => Some(CardinalityRule::ZeroToMany),
            "{1:M}" => Some(CardinalityRule::OneToMany),
            "{0:3}" => Some(CardinalityRule::ZeroToThree),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            CardinalityRule::ZeroToOne => "{0:1}",
            CardinalityRule::One => "{1:1}",
            CardinalityRule::ZeroToMany => "{0:M}",
            CardinalityRule::OneToMany => "{1:M}",
            CardinalityRule::ZeroToThree => "{0:3}",
        }
    }

    pub fn required(&self) -> bool {
        matches!(self, CardinalityRule::One | CardinalityRule::OneToMany)
    }

    /// Maximum observed count permitted; `None` means unbounded.
    pub fn maximum(&self) -> Option<u32> {
        match self {
            CardinalityRule::ZeroToOne | CardinalityRule::One => Some(1),
            CardinalityRule::ZeroToThree => Some(3),
            CardinalityRule::ZeroToMany | CardinalityRule::OneToMany => None,
        }
    }
}

/// The grammar a structure's payload must satisfy.
///
/// Built-in categories are a closed set; anything else lands in `Custom`
/// and is dispatched through the validator's registered-parser map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadType {
    /// No payload permitted
    Null,
    /// The literal affirmative token "Y" or nothing
    Boolean,
    NonNegativeInteger,
    /// Free text, no grammar
    Text,
    /// A single token from the schema's enumeration set
    Enumeration,
    /// Comma-separated tokens, each from the enumeration set
    EnumerationList,
    /// `day month year` with a real-calendar confirmation
    DateExact,
    /// Plain date, period, range, or approximation
    DateValue,
    /// `FROM x`, `TO x`, `FROM x TO y`
    DatePeriod,
    /// `H:MM[:SS[.fraction]][Z]`
    Time,
    /// Duration tokens in descending units, or 5.5.1 keywords
    Age,
    PersonalName,
    /// RFC2045-style `type/subtype`
    MediaType,
    /// Relative or absolute reference
    FilePath,
    /// Pointer to a record of the given canonical identity
    Pointer(String),
    /// Dispatched through a registered custom parser
    Custom(String),
}

impl PayloadType {
    /// Interpret the payload-type token handed over by the registry
    /// collaborator. An absent token means no payload is permitted.
    pub fn from_token(token: Option<&str>) -> Self {
        let token = match token {
            None => return PayloadType::Null,
            Some(t) if t.is_empty() => return PayloadType::Null,
            Some(t) => t,
        };
        match token {
            "Y|<NULL>" => PayloadType::Boolean,
            "http://www.w3.org/2001/XMLSchema#nonNegativeInteger" => {
                PayloadType::NonNegativeInteger
            }
            "http://www.w3.org/2001/XMLSchema#string" => PayloadType::Text,
            "https://gedcom.io/terms/v7/type-Enum" => PayloadType::Enumeration,
            "https://gedcom.io/terms/v7/type-List#Enum" => PayloadType::EnumerationList,
            "https://gedcom.io/terms/v7/type-Date#exact" => PayloadType::DateExact,
            "https://gedcom.io/terms/v7/type-Date" => PayloadType::DateValue,
            "https://gedcom.io/terms/v7/type-Date#period" => PayloadType::DatePeriod,
            "https://gedcom.io/terms/v7/type-Time" => PayloadType::Time,
            "https://gedcom.io/terms/v7/type-Age" => PayloadType::Age,
            "https://gedcom.io/terms/v7/type-Name" => PayloadType::PersonalName,
            "http://www.w3.org/ns/dcat#mediaType" => PayloadType::MediaType,
            "https://gedcom.io/terms/v7/type-FilePath" => PayloadType::FilePath,
            _ => {
                if let Some(inner) = token
                    .strip_prefix("@<")
                    .and_then(|rest| rest.strip_suffix(">@"))
                {
                    PayloadType::Pointer(inner.to_string())
                } else {
                    PayloadType::Custom(token.to_string())
                }
            }
        }
    }
}

/// A resolved rule set governing one tag's placement, cardinality, and
/// payload grammar.
///
/// Documented schemas come from the registry; undocumented ones are
/// synthesized on demand with no constraints and cached so repeated lookups
/// for the same undeclared tag return the same object.
#[derive(Debug, Clone)]
pub struct StructureSchema {
    pub standard_tag: String,
    /// Canonical identity (URI or equivalent opaque key)
    pub identity: String,
    pub payload: PayloadType,
    /// Child identity -> cardinality rule
    pub substructures: BTreeMap<String, CardinalityRule>,
    /// Parent identity -> cardinality rule
    pub superstructures: BTreeMap<String, CardinalityRule>,
    pub enumeration_set: Option<String>,
    pub documented: bool,
}

impl StructureSchema {
    /// Synthesize a constraint-free schema for an undeclared tag.
    pub fn undocumented(tag: &str) -> Self {
        Self {
            standard_tag: tag.to_string(),
            identity: format!("undocumented:{tag}"),
            payload: PayloadType::Text,
            substructures: BTreeMap::new(),
            superstructures: BTreeMap::new(),
            enumeration_set: None,
            documented: false,
        }
    }

    /// A minimal extension schema declared by a document: tag plus identity,
    /// no structural constraints.
    pub fn minimal(tag: &str, identity: &str) -> Self {
        Self {
            standard_tag: tag.to_string(),
            identity: identity.to_string(),
            payload: PayloadType::Text,
            substructures: BTreeMap::new(),
            superstructures: BTreeMap::new(),
            enumeration_set: None,
            documented: false,
        }
    }
}

/// A closed list of legal payload tokens for enum-typed payloads,
/// resolved to canonical short tags at registry load time.
#[derive(Debug, Clone, Default)]
pub struct EnumerationSet {
    pub identity: String,
    pub members: Vec<String>,
}

impl EnumerationSet {
    pub fn contains(&self, token: &str) -> bool {
        self.members.iter().any(|m| m == token)
    }
}

/// Month and epoch membership rules for one calendar system.
#[derive(Debug, Clone)]
pub struct CalendarSchema {
    pub identity: String,
    pub standard_tag: String,
    /// Canonical three-letter month tags, in calendar order
    pub months: Vec<String>,
    pub epochs: Vec<String>,
}

impl CalendarSchema {
    pub fn has_month(&self, tag: &str) -> bool {
        self.months.iter().any(|m| m == tag)
    }

    pub fn has_epoch(&self, label: &str) -> bool {
        self.epochs.iter().any(|e| e == label)
    }
}

/// Extension tags are marked with a leading underscore.
pub fn is_extension_tag(tag: &str) -> bool {
    tag.starts_with('_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinality_round_trip() {
        for token in ["{0:1}", "{1:1}", "{0:M}", "{1:M}", "{0:3}"] {
            let rule = CardinalityRule::from_token(token).unwrap();
            assert_eq!(rule.token(), token);
        }
        assert!(CardinalityRule::from_token("{2:5}").is_none());
    }

    #[test]
    fn test_cardinality_pairs_are_unique() {
        let rules = [
            CardinalityRule::ZeroToOne,
            CardinalityRule::One,
            CardinalityRule::ZeroToMany,
            CardinalityRule::OneToMany,
            CardinalityRule::ZeroToThree,
        ];
        for (i, a) in rules.iter().enumerate() {
            for b in rules.iter().skip(i + 1) {
                assert!(a.required() != b.required() || a.maximum() != b.maximum());
            }
        }
    }

    #[test]
    fn test_payload_token_mapping() {
        assert_eq!(PayloadType::from_token(None), PayloadType::Null);
        assert_eq!(PayloadType::from_token(Some("Y|<NULL>")), PayloadType::Boolean);
        assert_eq!(
            PayloadType::from_token(Some("https://gedcom.io/terms/v7/type-Date")),
            PayloadType::DateValue
        );
        assert_eq!(
            PayloadType::from_token(Some("@<https://gedcom.io/terms/v7/record-INDI>@")),
            PayloadType::Pointer("https://gedcom.io/terms/v7/record-INDI".to_string())
        );
        assert_eq!(
            PayloadType::from_token(Some(LANGUAGE_PAYLOAD)),
            PayloadType::Custom(LANGUAGE_PAYLOAD.to_string())
        );
    }

    #[test]
    fn test_extension_tag_detection() {
        assert!(is_extension_tag("_UID"));
        assert!(!is_extension_tag("NAME"));
    }
}
