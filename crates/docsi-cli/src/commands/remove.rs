//! Remove command implementation

use anyhow::Result;
use colored::Colorize;

use crate::utils::Context;

pub fn execute(ctx: &Context, alias: &str, quiet: bool) -> Result<()> {
    ctx.require(alias)?;
    let fragments = ctx
        .storage
        .load_meta(alias)?
        .map(|meta| meta.fragments)
        .unwrap_or_default();

    ctx.storage.remove(alias)?;

    if !quiet {
        println!(
            "{} Removed {} ({fragments} fragments)",
            "✓".green(),
            alias.red()
        );
    }
    Ok(())
}
