//! Pages command implementation

use anyhow::Result;
use colored::Colorize;

use crate::output::{self, OutputFormat};
use crate::utils::Context;

pub fn execute(ctx: &Context, alias: &str, format: OutputFormat) -> Result<()> {
    let pages = ctx.collection(alias)?.pages();

    if format.is_machine() {
        return output::print_items(format, &pages);
    }

    for page in &pages {
        println!(
            "{}  {}  {}",
            page.page.bold(),
            output::display_location(&page.path).bright_black(),
            format!("({} fragments)", page.fragments).dimmed()
        );
    }
    Ok(())
}
