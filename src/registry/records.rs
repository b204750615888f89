//! Hand-off records supplied by the registry-document collaborator
//!
//! The collaborator parses the external registry documents into these
//! pre-parsed records; the core never sees registry document text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One structure definition from the registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructureRecord {
    /// Canonical identity (URI or equivalent opaque key)
    pub identity: String,
    pub standard_tag: String,
    #[serde(default)]
    pub label: Option<String>,
    /// Payload-type token; absent means no payload is permitted
    #[serde(default)]
    pub payload: Option<String>,
    /// Free-text specification lines, carried through untouched
    #[serde(default)]
    pub specification: Vec<String>,
    /// Child identity -> cardinality token
    #[serde(default)]
    pub substructures: BTreeMap<String, String>,
    /// Parent identity -> cardinality token; empty means this is a
    /// top-level record definition
    #[serde(default)]
    pub superstructures: BTreeMap<String, String>,
    #[serde(default)]
    pub enumeration_set: Option<String>,
}

/// An enumeration-set definition: an ordered list of member identities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnumerationRecord {
    pub identity: String,
    pub members: Vec<String>,
}

/// A calendar definition: month identities plus epoch labels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarRecord {
    pub identity: String,
    pub standard_tag: String,
    pub months: Vec<String>,
    pub epochs: Vec<String>,
}

/// A month definition carrying its canonical short tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthRecord {
    pub identity: String,
    pub standard_tag: String,
}

/// Everything the collaborator hands over for one load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryData {
    #[serde(default)]
    pub structures: Vec<StructureRecord>,
    #[serde(default)]
    pub enumerations: Vec<EnumerationRecord>,
    #[serde(default)]
    pub calendars: Vec<CalendarRecord>,
    #[serde(default)]
    pub months: Vec<MonthRecord>,
}
