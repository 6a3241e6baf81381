//! Show command implementation

use anyhow::{Result, bail};
use colored::Colorize;

use crate::output::{self, OutputFormat};
use crate::utils::Context;

/// Accepts the root as `/` as well as the empty string.
fn normalize(location: &str) -> &str {
    if location == "/" { "" } else { location }
}

pub fn execute(ctx: &Context, alias: &str, location: &str, format: OutputFormat) -> Result<()> {
    let collection = ctx.collection(alias)?;
    let fragments = collection.by_location(normalize(location));

    if fragments.is_empty() {
        let suggestions = collection.suggest_pages(location, 3);
        if suggestions.is_empty() {
            bail!("No fragments at '{location}' in {alias}. Try `docsi pages {alias}`");
        }
        let hints: Vec<String> = collection
            .pages()
            .into_iter()
            .filter(|p| suggestions.contains(&p.page))
            .map(|p| format!("{} ({})", p.page, output::display_location(&p.path)))
            .collect();
        bail!(
            "No fragments at '{location}' in {alias}. Did you mean: {}",
            hints.join(", ")
        );
    }

    if format.is_machine() {
        return output::print_items(format, &fragments);
    }

    for (i, fragment) in fragments.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!(
            "{} {}  {}",
            output::category_label(fragment.category),
            fragment.title.bold(),
            output::display_location(&fragment.location).bright_black()
        );
        if !fragment.text.is_empty() {
            println!("{}", fragment.text);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn test_root_aliases() {
        assert_eq!(normalize("/"), "");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("man/plotting/"), "man/plotting/");
    }
}
