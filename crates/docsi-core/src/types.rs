//! Core data types: fragments, the documents that hold them, stored source
//! metadata, search hits and validation diagnostics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role a fragment plays in the rendered documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Body text of a page.
    Page,
    /// A heading; normally carries no text.
    Section,
    /// A documented function docstring.
    Function,
    /// A documented type docstring.
    Type,
}

impl Category {
    /// Every category, in wire-tag order.
    pub const ALL: [Self; 4] = [Self::Page, Self::Section, Self::Function, Self::Type];

    /// The tag written into the search index.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Section => "section",
            Self::Function => "function",
            Self::Type => "type",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category `{s}`"))
    }
}

/// One indexed span of rendered documentation.
///
/// Field order matches the order the generator writes, which keeps
/// re-serialized output byte-identical to the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fragment {
    /// Page path plus optional `#anchor`. Empty for the site root.
    pub location: String,
    /// Human-readable page title.
    pub page: String,
    /// Section or symbol title; may equal `page`.
    pub title: String,
    /// Indexed text; empty for bare section headers.
    pub text: String,
    /// Fragment role.
    pub category: Category,
}

impl Fragment {
    /// Location without its anchor.
    #[must_use]
    pub fn path(&self) -> &str {
        self.location
            .split_once('#')
            .map_or(self.location.as_str(), |(path, _)| path)
    }

    /// Anchor portion of the location, if any.
    #[must_use]
    pub fn anchor(&self) -> Option<&str> {
        self.location.split_once('#').map(|(_, anchor)| anchor)
    }

    /// A section fragment with no text of its own.
    #[must_use]
    pub fn is_header(&self) -> bool {
        self.category == Category::Section && self.text.is_empty()
    }
}

/// The ordered fragment array of one documentation build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchIndexDocument {
    /// Fragments in generator order. Ordinals are positions in this vector.
    pub docs: Vec<Fragment>,
}

impl SearchIndexDocument {
    /// Wrap an ordered fragment list.
    #[must_use]
    pub const fn new(docs: Vec<Fragment>) -> Self {
        Self { docs }
    }

    /// Number of fragments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether the build has no fragments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

/// Where a stored search index came from and what it looked like.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMeta {
    /// URL or local path the index was read from.
    pub origin: String,
    /// `ETag` validator from the last fetch.
    pub etag: Option<String>,
    /// `Last-Modified` validator from the last fetch.
    pub last_modified: Option<String>,
    /// When the origin was last checked.
    pub fetched_at: DateTime<Utc>,
    /// Base64 SHA-256 of the raw file.
    pub sha256: String,
    /// Identifier the file bound its data to, when it had one.
    pub binding: Option<String>,
    /// Number of fragments kept after parsing.
    pub fragments: usize,
}

impl SourceMeta {
    /// Whether the origin is fetched over HTTP rather than read from disk.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.origin.starts_with("http://") || self.origin.starts_with("https://")
    }
}

/// One ranked result from the full-text index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// Source the fragment belongs to.
    pub alias: String,
    /// Fragment location, as in [`Fragment::location`].
    pub location: String,
    /// Page title.
    pub page: String,
    /// Fragment title.
    pub title: String,
    /// Fragment role.
    pub category: Category,
    /// Text window around the first matching term.
    pub snippet: String,
    /// Relevance score; higher is better.
    pub score: f32,
}

/// A finding from parsing or validating a search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// How serious the finding is.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Zero-based record position the diagnostic refers to.
    pub record: Option<usize>,
}

impl Diagnostic {
    /// An error-level diagnostic.
    pub fn error(record: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            record,
        }
    }

    /// A warning.
    pub fn warn(record: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warn,
            message: message.into(),
            record,
        }
    }

    /// An informational note.
    pub fn info(record: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            record,
        }
    }
}

/// Diagnostic level, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The record or file is unusable.
    Error,
    /// Usable, but probably not what the generator meant.
    Warn,
    /// Worth knowing.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
        })
    }
}
