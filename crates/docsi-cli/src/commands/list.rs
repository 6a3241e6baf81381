//! List command implementation

use anyhow::Result;
use colored::Colorize;
use docsi_core::SourceMeta;
use serde::Serialize;

use crate::output::{self, OutputFormat};
use crate::utils::Context;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceEntry {
    alias: String,
    #[serde(flatten)]
    meta: SourceMeta,
}

pub fn execute(ctx: &Context, format: OutputFormat) -> Result<()> {
    let mut entries = Vec::new();
    for alias in ctx.storage.list_sources() {
        match ctx.storage.load_meta(&alias)? {
            Some(meta) => entries.push(SourceEntry { alias, meta }),
            None => tracing::warn!("{alias}: metadata missing, skipping"),
        }
    }

    if format.is_machine() {
        return output::print_items(format, &entries);
    }

    if entries.is_empty() {
        println!("No sources stored. Use `docsi add <alias> <url-or-path>` to add one.");
        return Ok(());
    }

    for entry in &entries {
        println!("{} - {}", entry.alias.cyan().bold(), entry.meta.origin.bright_black());
        println!(
            "  {} fragments, fetched {}",
            entry.meta.fragments,
            entry.meta.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    Ok(())
}
