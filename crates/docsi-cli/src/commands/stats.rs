//! Stats command implementation

use anyhow::Result;
use colored::Colorize;
use docsi_core::{Report, SourceMeta, validate};
use serde::Serialize;

use crate::output::{self, OutputFormat};
use crate::utils::Context;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Stats {
    alias: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<SourceMeta>,
    report: Report,
    archives: usize,
}

pub fn execute(ctx: &Context, alias: &str, format: OutputFormat) -> Result<()> {
    let document = ctx.document(alias)?;
    let stats = Stats {
        alias: alias.to_string(),
        meta: ctx.storage.load_meta(alias)?,
        report: validate::validate(&document),
        archives: ctx.storage.list_archives(alias)?.len(),
    };

    match format {
        OutputFormat::Json => output::print_json(&stats),
        OutputFormat::Jsonl => output::print_jsonl([&stats]),
        OutputFormat::Text => {
            print_text(&stats);
            Ok(())
        },
    }
}

fn print_text(stats: &Stats) {
    println!("{}", stats.alias.cyan().bold());
    if let Some(meta) = &stats.meta {
        println!("  origin:     {}", meta.origin);
        println!(
            "  fetched:    {}",
            meta.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        if let Some(binding) = &meta.binding {
            println!("  binding:    {binding}");
        }
    }
    let report = &stats.report;
    println!("  fragments:  {}", report.fragments);
    println!("  pages:      {}", report.pages);
    println!("  locations:  {}", report.distinct_locations);
    for (category, count) in &report.categories {
        println!("    {:<10}{count}", category.to_string());
    }
    println!("  archives:   {}", stats.archives);
    let findings = report.diagnostics.len();
    if findings > 0 {
        println!("  {}", format!("{findings} lint findings").dimmed());
    }
}
