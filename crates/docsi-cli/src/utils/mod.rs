//! Helpers shared by the command implementations.

pub mod logging;
pub mod store;

pub use store::{Context, Origin, RawSource};
