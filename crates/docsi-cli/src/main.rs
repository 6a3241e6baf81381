//! docsi CLI - cache and search documentation search indexes
//!
//! Entry point for the `docsi` binary. Each command lives in its own
//! module under [`commands`].

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod output;
mod utils;

use cli::{Cli, Commands};
use utils::Context;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    utils::logging::initialize_logging(&cli)?;

    execute_command(cli).await
}

async fn execute_command(cli: Cli) -> Result<()> {
    let quiet = cli.quiet;
    let config_path = cli.config.clone();
    let context = || Context::load(config_path.as_deref());

    match cli.command {
        Commands::Add {
            alias,
            source,
            lenient,
            force,
        } => commands::add_source(&context()?, &alias, &source, lenient, force, quiet).await,

        Commands::Update {
            alias,
            all,
            lenient,
        } => match alias {
            Some(alias) if !all => {
                commands::update_source(&context()?, &alias, lenient, quiet).await
            },
            _ => commands::update_all(&context()?, lenient, quiet).await,
        },

        Commands::List { format } => commands::list_sources(&context()?, format),

        Commands::Remove { alias } => commands::remove_source(&context()?, &alias, quiet),

        Commands::Search {
            query,
            sources,
            category,
            limit,
            format,
        } => commands::search(&context()?, &query, &sources, category, limit, format),

        Commands::Lookup {
            query,
            source,
            category,
            page,
            limit,
            format,
        } => commands::lookup(&context()?, &query, &source, category, page, limit, format),

        Commands::Pages { alias, format } => commands::list_pages(&context()?, &alias, format),

        Commands::Show {
            alias,
            location,
            format,
        } => commands::show_location(&context()?, &alias, &location, format),

        // Works on a file, never on storage.
        Commands::Validate {
            file,
            lenient,
            format,
        } => commands::validate_file(&file, lenient, format),

        Commands::Export {
            alias,
            binding,
            json,
            output,
        } => commands::export_source(
            &context()?,
            &alias,
            binding.as_deref(),
            json,
            output.as_deref(),
        ),

        Commands::Diff { alias, format } => commands::show_diff(&context()?, &alias, format),

        Commands::Stats { alias, format } => commands::show_stats(&context()?, &alias, format),
    }
}
