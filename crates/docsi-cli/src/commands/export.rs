//! Export command implementation

use anyhow::{Context as _, Result};
use docsi_core::codec;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::utils::Context;

/// Binding precedence: `--binding`, then the identifier the source file
/// used, then `export.binding` from the configuration.
pub fn execute(
    ctx: &Context,
    alias: &str,
    binding: Option<&str>,
    json: bool,
    output: Option<&Path>,
) -> Result<()> {
    let document = ctx.document(alias)?;

    let rendered = if json {
        let mut pretty = codec::render_json(&document)?;
        pretty.push('\n');
        pretty
    } else {
        let recorded = ctx.storage.load_meta(alias)?.and_then(|meta| meta.binding);
        let binding = binding
            .map(ToString::to_string)
            .or(recorded)
            .unwrap_or_else(|| ctx.config.export.binding.clone());
        codec::render(&document, &binding)?
    };

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} fragments to {}", document.len(), path.display());
        },
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        },
    }
    Ok(())
}
