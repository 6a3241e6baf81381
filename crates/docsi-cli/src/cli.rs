//! # CLI Structure and Argument Parsing
//!
//! `docsi` follows a plain command/subcommand layout:
//!
//! ```bash
//! # Source management
//! docsi add geo https://example.org/dev/search_index.js
//! docsi add local ./docs/build/search_index.js
//! docsi list
//! docsi update --all
//!
//! # Querying
//! docsi search "creep law" --category function
//! docsi lookup ComputeDensity --source geo
//! docsi show geo man/plotting/
//!
//! # Files
//! docsi validate ./docs/build/search_index.js
//! docsi export geo -o search_index.js
//! ```
//!
//! Global options (`--verbose`, `--quiet`, `--no-color`, `--config`) apply to
//! every command. Read commands take `--format text|json|jsonl`.

use clap::{Parser, Subcommand};
use docsi_core::Category;
use std::path::PathBuf;

use crate::output::OutputFormat;

#[derive(Parser, Clone, Debug)]
#[command(name = "docsi")]
#[command(version)]
#[command(about = "docsi - cache and search documentation search indexes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Only show errors
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true, env = "DOCSI_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Add a search index from a URL or a local file
    Add {
        /// Name to store the source under
        alias: String,
        /// `http(s)` URL or filesystem path of a `search_index.js`
        source: String,
        /// Skip malformed records instead of rejecting the file
        #[arg(long)]
        lenient: bool,
        /// Replace an existing source with the same alias
        #[arg(short, long)]
        force: bool,
    },

    /// Re-read sources and replace them when the file changed
    Update {
        /// Source to update
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        alias: Option<String>,
        /// Update every stored source
        #[arg(long)]
        all: bool,
        /// Skip malformed records instead of rejecting the file
        #[arg(long)]
        lenient: bool,
    },

    /// List stored sources
    List {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Remove a source and its index
    #[command(alias = "rm")]
    Remove { alias: String },

    /// Ranked full-text search across stored sources
    Search {
        query: String,
        /// Restrict to these sources (repeatable)
        #[arg(short, long = "source", value_name = "ALIAS")]
        sources: Vec<String>,
        /// Restrict to one category (page, section, function, type)
        #[arg(short, long)]
        category: Option<Category>,
        /// Maximum hits (defaults to `search.default_limit`)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Keyword lookup within one source, as a browser search box does it
    Lookup {
        query: String,
        #[arg(short, long = "source", value_name = "ALIAS")]
        source: String,
        #[arg(short, long)]
        category: Option<Category>,
        /// Restrict to one page title
        #[arg(short, long)]
        page: Option<String>,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List the pages of a source
    Pages {
        alias: String,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the fragments at a location (`path/` or `path/#anchor`)
    Show {
        alias: String,
        location: String,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Check a search index file without storing it
    Validate {
        file: PathBuf,
        /// Report malformed records instead of stopping at the first one
        #[arg(long)]
        lenient: bool,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Regenerate a `search_index.js` from a stored source
    Export {
        alias: String,
        /// Identifier to bind the data to
        #[arg(long)]
        binding: Option<String>,
        /// Write `{"docs": [...]}` JSON instead of JavaScript
        #[arg(long)]
        json: bool,
        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Compare a source with its previous build
    Diff {
        alias: String,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Summarize a stored source
    Stats {
        alias: String,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

impl Commands {
    /// Output format of the command, for commands that have one.
    pub const fn format(&self) -> Option<OutputFormat> {
        match self {
            Self::List { format }
            | Self::Search { format, .. }
            | Self::Lookup { format, .. }
            | Self::Pages { format, .. }
            | Self::Show { format, .. }
            | Self::Validate { format, .. }
            | Self::Diff { format, .. }
            | Self::Stats { format, .. } => Some(*format),
            Self::Add { .. } | Self::Update { .. } | Self::Remove { .. } | Self::Export { .. } => {
                None
            },
        }
    }
}
