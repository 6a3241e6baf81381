//! Command implementations for the docsi CLI, one submodule per command.

mod add;
mod diff;
mod export;
mod list;
mod lookup;
mod pages;
mod remove;
mod search;
mod show;
mod stats;
mod update;
mod validate;

pub use add::execute as add_source;
pub use diff::execute as show_diff;
pub use export::execute as export_source;
pub use list::execute as list_sources;
pub use lookup::execute as lookup;
pub use pages::execute as list_pages;
pub use remove::execute as remove_source;
pub use search::execute as search;
pub use show::execute as show_location;
pub use stats::execute as show_stats;
pub use update::{execute as update_source, execute_all as update_all};
pub use validate::execute as validate_file;
