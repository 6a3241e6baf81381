//! Search command implementation

use anyhow::Result;
use colored::Colorize;
use docsi_core::{Category, SearchHit, SearchIndex, SearchOptions};
use std::time::Instant;
use tracing::{debug, warn};

use crate::output::{self, OutputFormat};
use crate::utils::Context;

pub fn execute(
    ctx: &Context,
    query: &str,
    sources: &[String],
    category: Option<Category>,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let started = Instant::now();
    let aliases = if sources.is_empty() {
        ctx.storage.list_sources()
    } else {
        for alias in sources {
            ctx.require(alias)?;
        }
        sources.to_vec()
    };
    let limit = limit.unwrap_or(ctx.config.search.default_limit);

    let hits = search_sources(ctx, &aliases, query, category, limit)?;
    debug!(
        "{} hits across {} sources in {}ms",
        hits.len(),
        aliases.len(),
        started.elapsed().as_millis()
    );

    if format.is_machine() {
        return output::print_items(format, &hits);
    }

    if aliases.is_empty() {
        println!("No sources stored. Use `docsi add` to add one.");
        return Ok(());
    }
    if hits.is_empty() {
        println!("No results for '{query}'");
        return Ok(());
    }
    print_text(&hits);
    Ok(())
}

/// Query each source's index and merge by score. Ties keep source order,
/// then document order within a source.
fn search_sources(
    ctx: &Context,
    aliases: &[String],
    query: &str,
    category: Option<Category>,
    limit: usize,
) -> Result<Vec<SearchHit>> {
    let mut hits = Vec::new();
    for alias in aliases {
        let dir = ctx.storage.index_dir(alias)?;
        if !dir.exists() {
            warn!("{alias} has no search index; run `docsi update {alias}`");
            continue;
        }
        let index = SearchIndex::open(&dir)?;
        let options = SearchOptions {
            alias: Some(alias.as_str()),
            category,
            limit,
            snippet_chars: ctx.config.search.snippet_chars,
        };
        hits.extend(index.search(query, &options)?);
    }

    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    hits.truncate(limit);
    Ok(hits)
}

fn print_text(hits: &[SearchHit]) {
    for (i, hit) in hits.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!(
            "{}:{} {} {}",
            hit.alias.cyan().bold(),
            output::display_location(&hit.location),
            output::category_label(hit.category),
            hit.title.bold()
        );
        if !hit.snippet.is_empty() {
            println!("  {}", hit.snippet.replace('\n', " "));
        }
        println!("  {}", format!("{} · score {:.2}", hit.page, hit.score).dimmed());
    }
}
