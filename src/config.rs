//! Configuration for the conformance tooling
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (conform.toml)
//! - Environment variables (GEDCOM_CONFORM_*)
//!
//! ## Example config file (conform.toml):
//! ```toml
//! [dialect]
//! default_version = "7.0"
//!
//! [compare]
//! exempt_paths = ["HEAD.SOUR", "HEAD.DEST", "HEAD.DATE"]
//!
//! [validation]
//! strict = false
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::compare::DEFAULT_EXEMPT_PATHS;
use crate::version::GedcomVersion;

/// Main configuration for the conformance tooling
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConformConfig {
    #[serde(default)]
    pub dialect: DialectConfig,

    #[serde(default)]
    pub compare: CompareConfig,

    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Dialect selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialectConfig {
    /// Dialect assumed when a document carries no detectable version
    #[serde(default = "default_version")]
    pub default_version: String,
}

impl DialectConfig {
    pub fn default_version(&self) -> Option<GedcomVersion> {
        GedcomVersion::parse(&self.default_version)
    }
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            default_version: default_version(),
        }
    }
}

/// Comparison settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Tag-path prefixes excluded from matching
    #[serde(default = "default_exempt_paths")]
    pub exempt_paths: Vec<String>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            exempt_paths: default_exempt_paths(),
        }
    }
}

/// Validation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Strict mode: a comparison below full compliance fails the run
    #[serde(default)]
    pub strict: bool,
}

impl ConformConfig {
    /// Load configuration from conform.toml and GEDCOM_CONFORM_* overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("conform").required(false))
            .add_source(
                Environment::with_prefix("GEDCOM_CONFORM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

fn default_version() -> String {
    "7.0".to_string()
}

fn default_exempt_paths() -> Vec<String> {
    DEFAULT_EXEMPT_PATHS.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConformConfig::default();
        assert_eq!(config.dialect.default_version(), Some(GedcomVersion::V70));
        assert_eq!(config.compare.exempt_paths.len(), 3);
        assert!(!config.validation.strict);
    }
}
