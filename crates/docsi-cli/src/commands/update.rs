//! Update command implementation

use anyhow::{Result, anyhow, bail};
use chrono::Utc;
use colored::Colorize;
use docsi_core::{FetchResult, Fetcher, ParseMode, SourceMeta};
use tracing::info;

use crate::utils::{Context, Origin, RawSource, store};

enum Outcome {
    Unchanged,
    Updated {
        before: usize,
        after: usize,
        skipped: usize,
    },
}

pub async fn execute(ctx: &Context, alias: &str, lenient: bool, quiet: bool) -> Result<()> {
    ctx.require(alias)?;
    let outcome = update_one(ctx, alias, parse_mode(lenient)).await?;
    if !quiet {
        report(alias, &outcome);
    }
    Ok(())
}

pub async fn execute_all(ctx: &Context, lenient: bool, quiet: bool) -> Result<()> {
    let aliases = ctx.storage.list_sources();
    if aliases.is_empty() {
        if !quiet {
            println!("No sources stored. Use `docsi add` to add one.");
        }
        return Ok(());
    }

    let mut failed = 0usize;
    for alias in &aliases {
        match update_one(ctx, alias, parse_mode(lenient)).await {
            Ok(outcome) => {
                if !quiet {
                    report(alias, &outcome);
                }
            },
            Err(e) => {
                failed += 1;
                eprintln!("{} {alias}: {e:#}", "✗".red());
            },
        }
    }

    if failed > 0 {
        bail!("{failed} of {} sources failed to update", aliases.len());
    }
    Ok(())
}

const fn parse_mode(lenient: bool) -> ParseMode {
    if lenient {
        ParseMode::Lenient
    } else {
        ParseMode::Strict
    }
}

async fn update_one(ctx: &Context, alias: &str, mode: ParseMode) -> Result<Outcome> {
    let mut meta = ctx.storage.load_meta(alias)?.ok_or_else(|| {
        anyhow!("Source '{alias}' has no metadata; re-add it with `docsi add --force`")
    })?;

    let raw = match Origin::parse(&meta.origin) {
        Origin::Url(url) => {
            let fetcher = Fetcher::new()?;
            let result = fetcher
                .fetch_with_cache(
                    url.as_str(),
                    meta.etag.as_deref(),
                    meta.last_modified.as_deref(),
                )
                .await?;
            match result {
                FetchResult::NotModified {
                    etag,
                    last_modified,
                } => {
                    info!("{alias}: not modified");
                    touch(ctx, alias, &mut meta, etag, last_modified)?;
                    return Ok(Outcome::Unchanged);
                },
                FetchResult::Modified {
                    content,
                    etag,
                    last_modified,
                    sha256,
                } => RawSource {
                    origin: meta.origin.clone(),
                    content,
                    etag,
                    last_modified,
                    sha256,
                },
            }
        },
        Origin::Path(path) => RawSource::from_path(&path)?,
    };

    if raw.sha256 == meta.sha256 {
        info!("{alias}: content unchanged");
        touch(ctx, alias, &mut meta, raw.etag, raw.last_modified)?;
        return Ok(Outcome::Unchanged);
    }

    let before = meta.fragments;
    let (meta, skipped) = store::ingest(&ctx.storage, alias, raw, mode, true)?;
    Ok(Outcome::Updated {
        before,
        after: meta.fragments,
        skipped: skipped.len(),
    })
}

/// Record a check that found nothing new.
fn touch(
    ctx: &Context,
    alias: &str,
    meta: &mut SourceMeta,
    etag: Option<String>,
    last_modified: Option<String>,
) -> Result<()> {
    meta.fetched_at = Utc::now();
    if etag.is_some() {
        meta.etag = etag;
    }
    if last_modified.is_some() {
        meta.last_modified = last_modified;
    }
    ctx.storage.save_meta(alias, meta)?;
    Ok(())
}

fn report(alias: &str, outcome: &Outcome) {
    match outcome {
        Outcome::Unchanged => println!("{} {alias} is up to date", "✓".green()),
        Outcome::Updated {
            before,
            after,
            skipped,
        } => {
            println!(
                "{} Updated {} ({before} → {after} fragments)",
                "✓".green(),
                alias.green()
            );
            if *skipped > 0 {
                println!("  {} malformed records skipped", skipped.to_string().yellow());
            }
        },
    }
}
