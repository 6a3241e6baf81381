//! Validate command implementation

use anyhow::{Context as _, Result, bail};
use colored::Colorize;
use docsi_core::{ParseMode, Severity, codec, validate};
use std::path::Path;

use crate::output::{self, OutputFormat};

pub fn execute(file: &Path, lenient: bool, format: OutputFormat) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let mode = if lenient {
        ParseMode::Lenient
    } else {
        ParseMode::Strict
    };
    let parsed = codec::parse_with(&content, mode)
        .with_context(|| format!("{} is not a valid search index", file.display()))?;

    let mut report = validate::validate(&parsed.document);
    report.merge_decode_diagnostics(parsed.diagnostics);

    match format {
        OutputFormat::Json => output::print_json(&report)?,
        OutputFormat::Jsonl => output::print_jsonl(&report.diagnostics)?,
        OutputFormat::Text => print_text(file, parsed.binding.as_deref(), &report),
    }

    if !report.is_ok() {
        bail!(
            "{}: {} malformed records",
            file.display(),
            report.count(Severity::Error)
        );
    }
    Ok(())
}

fn print_text(file: &Path, binding: Option<&str>, report: &validate::Report) {
    for diagnostic in &report.diagnostics {
        println!("{}", output::diagnostic_line(diagnostic));
    }

    let categories: Vec<String> = report
        .categories
        .iter()
        .map(|(category, count)| format!("{category} {count}"))
        .collect();
    println!(
        "{}: {} fragments, {} pages, {} locations ({})",
        file.display(),
        report.fragments,
        report.pages,
        report.distinct_locations,
        categories.join(", ")
    );
    if let Some(binding) = binding {
        println!("  bound to {}", binding.cyan());
    }

    if report.is_ok() {
        println!(
            "{} valid ({} warnings)",
            "✓".green(),
            report.count(Severity::Warn)
        );
    }
}
