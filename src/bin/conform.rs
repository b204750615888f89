//! Conformance CLI
//!
//! Validates GEDCOM documents and compares two documents for compliance.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gedcom_conform::registry::builtin::standard_registry;
use gedcom_conform::{
    compare_with_exemptions, detect_version, load_document, ConformConfig, Diagnostic, Document,
    GedcomVersion, SchemaRegistry, Validator,
};

#[derive(Parser)]
#[command(name = "gedcom-conform")]
#[command(about = "Validate GEDCOM documents and compare them for compliance")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a document against the schema registry
    Validate {
        file: PathBuf,
        /// Dialect to assume instead of auto-detecting
        #[arg(short, long)]
        version: Option<String>,
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Compare a baseline document against another document
    Compare {
        baseline: PathBuf,
        other: PathBuf,
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Report the detected dialect of a document
    Detect { file: PathBuf },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ConformConfig::load().map_err(|e| anyhow!("bad configuration: {e}"))?;

    match cli.command {
        Commands::Validate {
            file,
            version,
            format,
        } => {
            let (doc, diagnostics, registry) = load(&file, version.as_deref(), &config)?;
            let validator = Validator::new(&registry, doc.version);
            let mut all = diagnostics;
            all.extend(validator.validate(&doc));
            all.sort_by_key(|d| d.line);

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&all)?);
            } else {
                print_diagnostics(&file, &doc, &all);
            }
            if !all.is_empty() {
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Compare {
            baseline,
            other,
            format,
        } => {
            let (base_doc, _, _) = load(&baseline, None, &config)?;
            let (other_doc, _, _) = load(&other, None, &config)?;

            let report =
                compare_with_exemptions(&base_doc, &other_doc, &config.compare.exempt_paths);
            let compliance = report.compliance_percentage();

            if format == "json" {
                let json = serde_json::json!({
                    "baseline_line_count": report.baseline_line_count,
                    "compliance_percentage": compliance,
                    "removed": report.removed.iter().map(|&id| base_doc.view(id)).collect::<Vec<_>>(),
                    "added": report.added.iter().map(|&id| other_doc.view(id)).collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            } else {
                print_comparison(&base_doc, &other_doc, &report);
            }

            let failed = if config.validation.strict {
                compliance < 100
            } else {
                !report.removed.is_empty()
            };
            if failed {
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Detect { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("cannot read {}", file.display()))?;
            let lines: Vec<&str> = content.lines().collect();
            match detect_version(&lines) {
                Some(version) => {
                    println!("{version}");
                    Ok(())
                }
                None => Err(anyhow!("no detectable version in {}", file.display())),
            }
        }
    }
}

fn load(
    path: &Path,
    version: Option<&str>,
    config: &ConformConfig,
) -> anyhow::Result<(Document, Vec<Diagnostic>, SchemaRegistry)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let lines: Vec<&str> = content.lines().collect();

    let requested = match version {
        Some(v) => {
            Some(GedcomVersion::parse(v).ok_or_else(|| anyhow!("unsupported version '{v}'"))?)
        }
        None => detect_version(&lines).or_else(|| config.dialect.default_version()),
    };
    let version = requested.ok_or_else(|| anyhow!("no usable dialect"))?;

    let mut registry = loaded_registry(version)?;
    let (doc, diagnostics) = load_document(&mut registry, &lines, Some(version));
    Ok((doc, diagnostics, registry))
}

fn loaded_registry(version: GedcomVersion) -> anyhow::Result<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();
    registry
        .load_all(version, &standard_registry())
        .map_err(|e| anyhow!("schema registry fault: {e}"))?;
    Ok(registry)
}

fn print_diagnostics(path: &Path, doc: &Document, diagnostics: &[Diagnostic]) {
    println!(
        "🔍 {} ({} lines, dialect {})\n",
        path.display(),
        doc.line_count,
        doc.version
    );
    if diagnostics.is_empty() {
        println!("✅ No findings");
        return;
    }

    let mut by_category: BTreeMap<&str, usize> = BTreeMap::new();
    for d in diagnostics {
        println!("  ❌ {d}");
        *by_category
            .entry(category_label(d))
            .or_default() += 1;
    }
    println!();
    println!("📊 {} findings:", diagnostics.len());
    for (label, count) in by_category {
        println!("   {label}: {count}");
    }
}

fn category_label(d: &Diagnostic) -> &'static str {
    use gedcom_conform::DiagnosticCategory::*;
    match d.category {
        StructuralSyntax => "structural syntax",
        Placement => "placement",
        Cardinality => "cardinality",
        PayloadFormat => "payload format",
        UnresolvedPointer => "unresolved pointer",
        Internal => "internal",
    }
}

fn print_comparison(
    base_doc: &Document,
    other_doc: &Document,
    report: &gedcom_conform::ComparisonReport,
) {
    if !report.removed.is_empty() {
        println!("📕 REMOVED ({}):", report.removed.len());
        for &id in &report.removed {
            let node = base_doc.node(id);
            println!(
                "   - Line {}: {}",
                node.line_number,
                base_doc.tag_path(id)
            );
        }
        println!();
    }
    if !report.added.is_empty() {
        println!("📗 ADDED ({}):", report.added.len());
        for &id in &report.added {
            let node = other_doc.node(id);
            println!(
                "   + Line {}: {}",
                node.line_number,
                other_doc.tag_path(id)
            );
        }
        println!();
    }

    println!("📊 SUMMARY:");
    println!("   Baseline lines: {}", report.baseline_line_count);
    println!("   Removed:        {}", report.removed.len());
    println!("   Added:          {}", report.added.len());
    println!("   Compliance:     {}%", report.compliance_percentage());
}
