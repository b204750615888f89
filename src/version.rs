//! GEDCOM dialect versions and identity gating

use serde::{Deserialize, Serialize};
use std::fmt;

/// A supported GEDCOM dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GedcomVersion {
    /// GEDCOM 5.5.1
    V551,
    /// FamilySearch GEDCOM 7.0
    V70,
    /// FamilySearch GEDCOM 7.1
    V71,
}

impl GedcomVersion {
    /// Parse a version payload such as "5.5.1" or "7.0.11"
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value == "5.5.1" {
            Some(GedcomVersion::V551)
        } else if value == "7.1" || value.starts_with("7.1.") {
            Some(GedcomVersion::V71)
        } else if value == "7.0" || value.starts_with("7.0.") || value == "7" {
            Some(GedcomVersion::V70)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GedcomVersion::V551 => "5.5.1",
            GedcomVersion::V70 => "7.0",
            GedcomVersion::V71 => "7.1",
        }
    }

    /// Whether a registry identity applies to this dialect.
    ///
    /// Identity strings embed a path marker: `/v5.5.1/` and `/v7.1/` pin a
    /// definition to one dialect; an identity with no marker applies to 7.0
    /// and 7.1 uniformly.
    pub fn identity_applies(&self, identity: &str) -> bool {
        if identity.contains("/v5.5.1/") {
            matches!(self, GedcomVersion::V551)
        } else if identity.contains("/v7.1/") {
            matches!(self, GedcomVersion::V71)
        } else if identity.contains("/v7.0/") {
            matches!(self, GedcomVersion::V70)
        } else {
            matches!(self, GedcomVersion::V70 | GedcomVersion::V71)
        }
    }

    /// Only 5.5.1 resolves the same tag differently for pointer and
    /// non-pointer payloads.
    pub fn distinguishes_pointer_payloads(&self) -> bool {
        matches!(self, GedcomVersion::V551)
    }

    /// Dialects before 7.0 tolerate stray indentation before the level.
    pub fn tolerates_leading_whitespace(&self) -> bool {
        matches!(self, GedcomVersion::V551)
    }
}

impl fmt::Display for GedcomVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        assert_eq!(GedcomVersion::parse("5.5.1"), Some(GedcomVersion::V551));
        assert_eq!(GedcomVersion::parse("7.0"), Some(GedcomVersion::V70));
        assert_eq!(GedcomVersion::parse("7.0.11"), Some(GedcomVersion::V70));
        assert_eq!(GedcomVersion::parse("7.1"), Some(GedcomVersion::V71));
        assert_eq!(GedcomVersion::parse("4.0"), None);
    }

    #[test]
    fn test_identity_gating() {
        let marked_551 = "https://gedcom.io/terms/v5.5.1/NOTE";
        let marked_71 = "https://gedcom.io/terms/v7.1/EXID";
        let unmarked = "https://gedcom.io/terms/v7/INDI";

        assert!(GedcomVersion::V551.identity_applies(marked_551));
        assert!(!GedcomVersion::V70.identity_applies(marked_551));

        assert!(GedcomVersion::V71.identity_applies(marked_71));
        assert!(!GedcomVersion::V70.identity_applies(marked_71));

        assert!(!GedcomVersion::V551.identity_applies(unmarked));
        assert!(GedcomVersion::V70.identity_applies(unmarked));
        assert!(GedcomVersion::V71.identity_applies(unmarked));
    }
}
