//! Shared plumbing between commands: configuration, storage, and turning a
//! raw file into a stored, indexed source.

use anyhow::{Context as _, Result, anyhow};
use chrono::Utc;
use docsi_core::{
    Collection, Config, Diagnostic, FetchResult, Fetcher, ParseMode, SearchIndex,
    SearchIndexDocument, SourceMeta, Storage, codec, fetcher,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use url::Url;

/// Loaded configuration plus the storage it points at.
pub struct Context {
    pub config: Config,
    pub storage: Storage,
}

impl Context {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        let storage = Storage::from_config(&config)?;
        debug!("Data root: {}", storage.root_dir().display());
        Ok(Self { config, storage })
    }

    /// Fail with the list of known sources when `alias` is not stored.
    pub fn require(&self, alias: &str) -> Result<()> {
        if self.storage.exists(alias) {
            return Ok(());
        }
        let known = self.storage.list_sources();
        if known.is_empty() {
            Err(anyhow!(
                "Source '{alias}' not found. No sources stored yet; add one with `docsi add`"
            ))
        } else {
            Err(anyhow!(
                "Source '{alias}' not found. Available: {}",
                known.join(", ")
            ))
        }
    }

    pub fn document(&self, alias: &str) -> Result<SearchIndexDocument> {
        self.require(alias)?;
        Ok(self.storage.load_document(alias)?)
    }

    pub fn collection(&self, alias: &str) -> Result<Collection> {
        Ok(Collection::new(self.document(alias)?))
    }
}

/// Where a search index is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Url(Url),
    Path(PathBuf),
}

impl Origin {
    /// `http(s)` URLs are fetched; anything else is a filesystem path.
    pub fn parse(source: &str) -> Self {
        match Url::parse(source) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Url(url),
            _ => Self::Path(PathBuf::from(source)),
        }
    }
}

/// A search index file as read, before parsing.
pub struct RawSource {
    pub origin: String,
    pub content: String,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub sha256: String,
}

impl RawSource {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let origin = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf())
            .display()
            .to_string();
        Ok(Self {
            sha256: fetcher::calculate_sha256(&content),
            origin,
            content,
            etag: None,
            last_modified: None,
        })
    }
}

/// Read `origin` unconditionally.
pub async fn read_origin(origin: &Origin) -> Result<RawSource> {
    match origin {
        Origin::Path(path) => RawSource::from_path(path),
        Origin::Url(url) => {
            let fetcher = Fetcher::new()?;
            match fetcher.fetch_with_cache(url.as_str(), None, None).await? {
                FetchResult::Modified {
                    content,
                    etag,
                    last_modified,
                    sha256,
                } => Ok(RawSource {
                    origin: url.to_string(),
                    content,
                    etag,
                    last_modified,
                    sha256,
                }),
                FetchResult::NotModified { .. } => {
                    Err(anyhow!("{url} answered 304 to an unconditional request"))
                },
            }
        },
    }
}

/// Parse, store and index `raw` under `alias`, replacing whatever was
/// stored before. With `archive_previous`, the stored raw file is archived
/// once the new content has parsed; a parse failure leaves storage as it
/// was. Returns the new metadata and any records skipped.
pub fn ingest(
    storage: &Storage,
    alias: &str,
    raw: RawSource,
    mode: ParseMode,
    archive_previous: bool,
) -> Result<(SourceMeta, Vec<Diagnostic>)> {
    let parsed = codec::parse_with(&raw.content, mode)
        .with_context(|| format!("Failed to parse {}", raw.origin))?;
    for diagnostic in &parsed.diagnostics {
        warn!(
            "{alias}: skipped record #{}: {}",
            diagnostic.record.unwrap_or_default(),
            diagnostic.message
        );
    }

    let meta = SourceMeta {
        origin: raw.origin,
        etag: raw.etag,
        last_modified: raw.last_modified,
        fetched_at: Utc::now(),
        sha256: raw.sha256,
        binding: parsed.binding,
        fragments: parsed.document.len(),
    };

    if archive_previous {
        match storage.archive(alias)? {
            Some(archived) => {
                info!("{alias}: previous build archived at {}", archived.display());
            },
            None => warn!("{alias}: no raw file to archive"),
        }
    }

    storage.save_raw(alias, &raw.content)?;
    storage.save_document(alias, &parsed.document)?;

    let mut index = SearchIndex::open_or_create(&storage.index_dir(alias)?)?;
    index.index_fragments(alias, &parsed.document.docs)?;

    storage.save_meta(alias, &meta)?;
    Ok((meta, parsed.diagnostics))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FIXTURE: &str = include_str!("../../../docsi-core/tests/fixtures/search_index.js");

    #[test]
    fn test_origin_detection() {
        assert!(matches!(
            Origin::parse("https://example.org/dev/search_index.js"),
            Origin::Url(_)
        ));
        assert!(matches!(Origin::parse("./search_index.js"), Origin::Path(_)));
        assert!(matches!(Origin::parse("C:\\docs\\search_index.js"), Origin::Path(_)));
        assert!(matches!(Origin::parse("file:///tmp/x.js"), Origin::Path(_)));
    }

    #[test]
    fn test_ingest_stores_everything() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::with_root(dir.path().to_path_buf()).unwrap();
        let file = dir.path().join("search_index.js");
        std::fs::write(&file, FIXTURE).unwrap();

        let raw = RawSource::from_path(&file).unwrap();
        let (meta, skipped) =
            ingest(&storage, "geo", raw, ParseMode::Strict, false).expect("ingest");

        assert!(skipped.is_empty());
        assert_eq!(meta.fragments, 70);
        assert_eq!(meta.binding.as_deref(), Some("documenterSearchIndex"));
        assert_eq!(storage.load_raw("geo").unwrap(), FIXTURE);
        assert_eq!(storage.load_document("geo").unwrap().len(), 70);
        assert!(storage.load_meta("geo").unwrap().is_some());

        let index = SearchIndex::open(&storage.index_dir("geo").unwrap()).unwrap();
        assert_eq!(index.num_docs(), 70);
    }

    #[test]
    fn test_ingest_rejects_bad_record_in_strict_mode() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::with_root(dir.path().to_path_buf()).unwrap();
        let raw = RawSource {
            origin: "inline".into(),
            content: concat!(
                r#"[{"location":"","page":"Home","title":"Home","#,
                r#""text":"","category":"module"}]"#
            )
            .into(),
            etag: None,
            last_modified: None,
            sha256: String::new(),
        };
        assert!(ingest(&storage, "bad", raw, ParseMode::Strict, false).is_err());
        assert!(!storage.exists("bad"));
    }

    #[test]
    fn test_failed_parse_does_not_archive_previous_build() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::with_root(dir.path().to_path_buf()).unwrap();
        let file = dir.path().join("search_index.js");
        std::fs::write(&file, FIXTURE).unwrap();
        ingest(
            &storage,
            "geo",
            RawSource::from_path(&file).unwrap(),
            ParseMode::Strict,
            false,
        )
        .unwrap();

        std::fs::write(&file, r#"{"docs":[{"location":""}]}"#).unwrap();
        let raw = RawSource::from_path(&file).unwrap();
        assert!(ingest(&storage, "geo", raw, ParseMode::Strict, true).is_err());
        assert!(storage.list_archives("geo").unwrap().is_empty());
        assert_eq!(storage.load_raw("geo").unwrap(), FIXTURE);

        std::fs::write(&file, FIXTURE.replace("Plotting", "Charts")).unwrap();
        let raw = RawSource::from_path(&file).unwrap();
        ingest(&storage, "geo", raw, ParseMode::Strict, true).unwrap();
        assert_eq!(storage.list_archives("geo").unwrap().len(), 1);
    }
}
