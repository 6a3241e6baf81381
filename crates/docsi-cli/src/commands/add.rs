//! Add command implementation

use anyhow::{Result, bail};
use colored::Colorize;
use docsi_core::{ParseMode, storage::validate_alias};
use tracing::info;

use crate::utils::{Context, Origin, store};

pub async fn execute(
    ctx: &Context,
    alias: &str,
    source: &str,
    lenient: bool,
    force: bool,
    quiet: bool,
) -> Result<()> {
    validate_alias(alias)?;
    if ctx.storage.exists(alias) && !force {
        bail!("Source '{alias}' already exists. Use `docsi update {alias}` or pass --force");
    }

    let origin = Origin::parse(source);
    let raw = store::read_origin(&origin).await?;
    info!("Read {} bytes from {}", raw.content.len(), raw.origin);

    let mode = if lenient {
        ParseMode::Lenient
    } else {
        ParseMode::Strict
    };

    let replacing = force && ctx.storage.exists(alias);
    let (meta, skipped) = store::ingest(&ctx.storage, alias, raw, mode, replacing)?;

    if !quiet {
        println!(
            "{} Added {} ({} fragments from {})",
            "✓".green(),
            alias.green(),
            meta.fragments,
            meta.origin
        );
        if !skipped.is_empty() {
            println!("  {} malformed records skipped", skipped.len().to_string().yellow());
        }
    }
    Ok(())
}
