//! Lookup command implementation
//!
//! Unranked keyword matching over one source, without the tantivy index.

use anyhow::Result;
use colored::Colorize;
use docsi_core::{Category, Filter};

use crate::output::{self, OutputFormat};
use crate::utils::Context;

pub fn execute(
    ctx: &Context,
    query: &str,
    alias: &str,
    category: Option<Category>,
    page: Option<String>,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let collection = ctx.collection(alias)?;
    let filter = Filter { category, page };
    let mut matches = collection.lookup(query, &filter);
    let total = matches.len();
    matches.truncate(limit.unwrap_or(ctx.config.search.default_limit));

    if format.is_machine() {
        return output::print_items(format, &matches);
    }

    if matches.is_empty() {
        println!("No fragments in {alias} contain '{query}'");
        return Ok(());
    }

    for m in &matches {
        println!(
            "{:>4} {} {}  {}",
            m.ordinal.to_string().dimmed(),
            output::category_label(m.fragment.category),
            m.fragment.title.bold(),
            output::display_location(&m.fragment.location).bright_black()
        );
    }
    if total > matches.len() {
        println!(
            "{}",
            format!("... {} more (use --limit)", total - matches.len()).dimmed()
        );
    }
    Ok(())
}
