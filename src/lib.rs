//! GEDCOM Conformance Toolkit
//!
//! Ingests line-oriented GEDCOM documents (dialects 5.5.1, 7.0, 7.1),
//! validates them against a version-aware schema registry, and computes a
//! fuzzy structural difference between two documents to report compliance.
//!
//! ## Features
//!
//! - **Versioned Schema Registry**: multi-tier resolution with run-time
//!   mutation for document-local extension declarations
//! - **Structural Validation**: placement, cardinality, and payload
//!   micro-grammars, accumulated as line-tagged diagnostics
//! - **Fuzzy Comparison**: greedy structural matching with
//!   cross-representation and split-payload equivalences, reporting a
//!   compliance percentage
//!
//! ## Architecture
//!
//! ```text
//! registry/       version-keyed schema maps, enumerations, calendars
//! parser          raw lines -> arena-owned document tree
//! validator/      placement + cardinality + payload grammars
//! compare         greedy match tables -> added/removed/compliance
//! ```

pub mod compare;
pub mod config;
pub mod document;
pub mod error;
pub mod parser;
pub mod registry;
pub mod schema;
pub mod validator;
pub mod version;

pub use compare::{compare, compare_with_exemptions, ComparisonReport};
pub use config::ConformConfig;
pub use document::{Document, NodeId, NodeView, StructureNode};
pub use error::{Diagnostic, DiagnosticCategory, Result, SchemaLoadError};
pub use parser::{detect_version, load_document};
pub use registry::records::RegistryData;
pub use registry::SchemaRegistry;
pub use schema::{CardinalityRule, PayloadType, StructureSchema};
pub use validator::Validator;
pub use version::GedcomVersion;
