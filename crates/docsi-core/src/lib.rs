//! # docsi-core
//!
//! Core functionality for docsi, a local cache and search tool for the
//! `search_index.js` files documentation generators publish next to
//! their rendered pages.
//!
//! ## Architecture
//!
//! - **Codec**: reads the JavaScript-bound fragment array and writes it
//!   back byte for byte
//! - **Validation**: structural lint over decoded fragments
//! - **Collection**: in-memory keyword lookup, the same thing a browser
//!   search widget does
//! - **Index**: persistent tantivy full-text index across sources
//! - **Storage / Fetcher**: per-alias cache on disk, conditional HTTP
//!
//! ## Quick Start
//!
//! ```rust
//! use docsi_core::{Collection, Filter, codec};
//!
//! let input = r#"var documenterSearchIndex = {"docs":
//! [{"location":"man/plotting/","page":"Plotting","title":"Plotting","text":"Plot creep laws","category":"page"}]
//! }
//! "#;
//!
//! let parsed = codec::parse(input)?;
//! assert_eq!(parsed.binding.as_deref(), Some("documenterSearchIndex"));
//!
//! let rendered = codec::render(&parsed.document, "documenterSearchIndex")?;
//! assert_eq!(rendered, input);
//!
//! let collection = Collection::new(parsed.document);
//! assert_eq!(collection.lookup("creep", &Filter::default()).len(), 1);
//! # Ok::<(), docsi_core::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`]:
//!
//! ```rust
//! use docsi_core::{Error, codec};
//!
//! match codec::parse("[{\"location\":\"\"}]") {
//!     Err(Error::InvalidRecord { index, reason }) => {
//!         assert_eq!(index, 0);
//!         assert!(reason.contains("missing"));
//!     },
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

/// Reading and writing `search_index.js`
pub mod codec;
/// In-memory keyword lookup
pub mod collection;
/// User configuration
pub mod config;
/// Comparing two builds
pub mod diff;
/// Error types and result aliases
pub mod error;
/// HTTP fetching with conditional requests support
pub mod fetcher;
/// Search index implementation using Tantivy
pub mod index;
/// Local filesystem storage for cached search indexes
pub mod storage;
/// Core data types
pub mod types;
/// Structural lint
pub mod validate;

pub use codec::{DEFAULT_BINDING, ParseMode, ParsedIndex};
pub use collection::{Collection, Filter, Match, PageSummary};
pub use config::{Config, ExportConfig, PathsConfig, SearchConfig};
pub use diff::{BuildDiff, Changed};
pub use error::{Error, Result};
pub use fetcher::{FetchResult, Fetcher};
pub use index::{SearchIndex, SearchOptions};
pub use storage::Storage;
pub use types::*;
pub use validate::Report;
