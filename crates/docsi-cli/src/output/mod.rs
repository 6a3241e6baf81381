//! # Output Formatting
//!
//! Every read command renders either human-readable text (colored when the
//! terminal allows it) or machine-readable JSON:
//!
//! ```bash
//! docsi search "density" --format json | jq '.[0].location'
//! docsi pages geo --format jsonl | while read line; do echo "$line" | jq .page; done
//! ```
//!
//! JSON is a single pretty-printed document. JSONL writes one compact
//! object per line, one line per item.

use anyhow::Result;
use colored::Colorize;
use docsi_core::{Category, Diagnostic, Severity};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    Text,
    /// One pretty-printed JSON document
    Json,
    /// One compact JSON object per line
    Jsonl,
}

impl OutputFormat {
    pub const fn is_machine(self) -> bool {
        matches!(self, Self::Json | Self::Jsonl)
    }
}

/// Write a whole value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// Write one compact JSON line per item.
pub fn print_jsonl<T: Serialize>(items: impl IntoIterator<Item = T>) -> Result<()> {
    let mut stdout = io::stdout().lock();
    for item in items {
        serde_json::to_writer(&mut stdout, &item)?;
        writeln!(stdout)?;
    }
    Ok(())
}

/// Emit `items` as a JSON array or JSON lines. Text output is the caller's job.
pub fn print_items<T: Serialize>(format: OutputFormat, items: &[T]) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(items),
        OutputFormat::Jsonl => print_jsonl(items),
        OutputFormat::Text => Ok(()),
    }
}

pub fn category_label(category: Category) -> String {
    let tag = format!("[{category}]");
    match category {
        Category::Page => tag.dimmed().to_string(),
        Category::Section => tag.blue().to_string(),
        Category::Function => tag.green().to_string(),
        Category::Type => tag.magenta().to_string(),
    }
}

/// `error: record #3: missing field `page``
pub fn diagnostic_line(diagnostic: &Diagnostic) -> String {
    let label = match diagnostic.severity {
        Severity::Error => "error".red().bold(),
        Severity::Warn => "warn".yellow(),
        Severity::Info => "info".cyan(),
    };
    match diagnostic.record {
        Some(record) => format!("{label}: record #{record}: {}", diagnostic.message),
        None => format!("{label}: {}", diagnostic.message),
    }
}

/// Location as shown to users; the site root has an empty location.
pub fn display_location(location: &str) -> &str {
    if location.is_empty() { "/" } else { location }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine_formats() {
        assert!(!OutputFormat::Text.is_machine());
        assert!(OutputFormat::Json.is_machine());
        assert!(OutputFormat::Jsonl.is_machine());
    }

    #[test]
    fn test_diagnostic_line_mentions_record() {
        colored::control::set_override(false);
        let line = diagnostic_line(&Diagnostic::error(Some(3), "missing field `page`"));
        assert_eq!(line, "error: record #3: missing field `page`");
        let line = diagnostic_line(&Diagnostic::warn(None, "empty"));
        assert_eq!(line, "warn: empty");
    }

    #[test]
    fn test_root_location_is_shown_as_slash() {
        assert_eq!(display_location(""), "/");
        assert_eq!(display_location("man/plotting/"), "man/plotting/");
    }
}
