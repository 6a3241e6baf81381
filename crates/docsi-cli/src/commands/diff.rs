//! Diff command implementation

use anyhow::{Context as _, Result, bail};
use colored::Colorize;
use docsi_core::{BuildDiff, Fragment, ParseMode, codec, diff};

use crate::output::{self, OutputFormat};
use crate::utils::Context;

/// Compare the stored build of `alias` with the most recently archived one.
pub fn execute(ctx: &Context, alias: &str, format: OutputFormat) -> Result<()> {
    let current = ctx.document(alias)?;

    let archives = ctx.storage.list_archives(alias)?;
    let Some(previous_path) = archives.last() else {
        bail!("{alias} has no archived build to compare with; run `docsi update {alias}` first");
    };
    let previous_raw = std::fs::read_to_string(previous_path)
        .with_context(|| format!("Failed to read {}", previous_path.display()))?;
    let previous = codec::parse_with(&previous_raw, ParseMode::Lenient)
        .with_context(|| format!("Archived build {} is unreadable", previous_path.display()))?
        .document;

    let changes = diff::diff(&previous, &current);

    match format {
        OutputFormat::Json => output::print_json(&changes)?,
        OutputFormat::Jsonl => output::print_jsonl(jsonl_lines(&changes))?,
        OutputFormat::Text => print_text(alias, &changes),
    }
    Ok(())
}

fn jsonl_lines(changes: &BuildDiff) -> Vec<serde_json::Value> {
    let tagged = |change: &str, fragment: &Fragment| {
        serde_json::json!({ "change": change, "fragment": fragment })
    };
    changes
        .removed
        .iter()
        .map(|f| tagged("removed", f))
        .chain(changes.added.iter().map(|f| tagged("added", f)))
        .chain(changes.changed.iter().map(|c| tagged("changed", &c.after)))
        .collect()
}

fn line(marker: colored::ColoredString, fragment: &Fragment) {
    println!(
        "{marker} {} {}  {}",
        output::category_label(fragment.category),
        fragment.title,
        output::display_location(&fragment.location).bright_black()
    );
}

fn print_text(alias: &str, changes: &BuildDiff) {
    if changes.is_empty() {
        println!(
            "{} {alias}: no changes ({} fragments unchanged)",
            "✓".green(),
            changes.unchanged
        );
        return;
    }

    for fragment in &changes.removed {
        line("-".red(), fragment);
    }
    for fragment in &changes.added {
        line("+".green(), fragment);
    }
    for change in &changes.changed {
        line("~".yellow(), &change.after);
    }
    println!(
        "{alias}: {} added, {} removed, {} changed, {} unchanged",
        changes.added.len(),
        changes.removed.len(),
        changes.changed.len(),
        changes.unchanged
    );
}
