//! On-disk cache of documentation sources.
//!
//! Each alias owns `sources/<alias>/` under the data root, holding the raw
//! `search_index.js`, the decoded `fragments.json`, `metadata.json`, the
//! tantivy index in `.index/` and earlier raw builds in `.archive/`.

use crate::{Config, Error, Result, SearchIndexDocument, SourceMeta};
use chrono::Utc;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Maximum allowed alias length
const MAX_ALIAS_LEN: usize = 64;

const RAW_FILE: &str = "search_index.js";
const DOCUMENT_FILE: &str = "fragments.json";
const METADATA_FILE: &str = "metadata.json";

/// Local filesystem storage for cached search indexes, one directory per alias.
///
/// ```text
/// <root>/sources/<alias>/search_index.js    raw file as ingested
/// <root>/sources/<alias>/fragments.json     parsed fragments
/// <root>/sources/<alias>/metadata.json      SourceMeta
/// <root>/sources/<alias>/.index/            tantivy index
/// <root>/sources/<alias>/.archive/          previous raw builds
/// ```
pub struct Storage {
    root_dir: PathBuf,
}

impl Storage {
    /// Creates a storage instance at the default root directory.
    ///
    /// `DOCSI_DATA_DIR` wins, then `XDG_DATA_HOME/docsi`, then the
    /// platform data directory.
    pub fn new() -> Result<Self> {
        Self::with_root(Self::default_root()?)
    }

    /// Like [`Storage::new`], but a configured `paths.root` beats the
    /// platform defaults. `DOCSI_DATA_DIR` still takes precedence.
    pub fn from_config(config: &Config) -> Result<Self> {
        if let Some(dir) = env_dir("DOCSI_DATA_DIR") {
            return Self::with_root(dir);
        }
        match &config.paths.root {
            Some(root) => Self::with_root(root.clone()),
            None => Self::new(),
        }
    }

    fn default_root() -> Result<PathBuf> {
        if let Some(dir) = env_dir("DOCSI_DATA_DIR") {
            return Ok(dir);
        }
        if let Some(xdg) = env_dir("XDG_DATA_HOME") {
            return Ok(xdg.join("docsi"));
        }
        ProjectDirs::from("dev", "docsi", "docsi")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| Error::Storage("Failed to determine data directory".into()))
    }

    /// Creates a storage instance with a custom root directory
    pub fn with_root(root_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root_dir)
            .map_err(|e| Error::Storage(format!("Failed to create root directory: {e}")))?;
        Ok(Self { root_dir })
    }

    /// Returns the data root
    #[must_use]
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Returns the directory path for a given alias
    pub fn source_dir(&self, alias: &str) -> Result<PathBuf> {
        validate_alias(alias)?;
        Ok(self.root_dir.join("sources").join(alias))
    }

    fn ensure_source_dir(&self, alias: &str) -> Result<PathBuf> {
        let dir = self.source_dir(alias)?;
        fs::create_dir_all(&dir)
            .map_err(|e| Error::Storage(format!("Failed to create source directory: {e}")))?;
        Ok(dir)
    }

    /// Returns the path of the stored raw file
    pub fn raw_path(&self, alias: &str) -> Result<PathBuf> {
        Ok(self.source_dir(alias)?.join(RAW_FILE))
    }

    /// Returns the path of the decoded fragments
    pub fn document_path(&self, alias: &str) -> Result<PathBuf> {
        Ok(self.source_dir(alias)?.join(DOCUMENT_FILE))
    }

    /// Returns the path of the source metadata
    pub fn metadata_path(&self, alias: &str) -> Result<PathBuf> {
        Ok(self.source_dir(alias)?.join(METADATA_FILE))
    }

    /// Returns the tantivy index directory
    pub fn index_dir(&self, alias: &str) -> Result<PathBuf> {
        Ok(self.source_dir(alias)?.join(".index"))
    }

    /// Returns the directory holding archived raw builds
    pub fn archive_dir(&self, alias: &str) -> Result<PathBuf> {
        Ok(self.source_dir(alias)?.join(".archive"))
    }

    /// Saves the raw search index file as ingested
    pub fn save_raw(&self, alias: &str, content: &str) -> Result<()> {
        self.ensure_source_dir(alias)?;
        write_atomic(&self.raw_path(alias)?, content.as_bytes())?;
        debug!("Saved {RAW_FILE} for {alias}");
        Ok(())
    }

    /// Loads the stored raw file
    pub fn load_raw(&self, alias: &str) -> Result<String> {
        let path = self.raw_path(alias)?;
        fs::read_to_string(&path)
            .map_err(|e| Error::Storage(format!("Failed to read {RAW_FILE}: {e}")))
    }

    /// Saves the decoded fragments
    pub fn save_document(&self, alias: &str, document: &SearchIndexDocument) -> Result<()> {
        self.ensure_source_dir(alias)?;
        let json = serde_json::to_string_pretty(document)
            .map_err(|e| Error::Storage(format!("Failed to serialize fragments: {e}")))?;
        write_atomic(&self.document_path(alias)?, json.as_bytes())?;
        debug!("Saved {DOCUMENT_FILE} for {alias}");
        Ok(())
    }

    /// Loads the decoded fragments, `NotFound` if the alias has none
    pub fn load_document(&self, alias: &str) -> Result<SearchIndexDocument> {
        let path = self.document_path(alias)?;
        if !path.exists() {
            return Err(Error::NotFound(format!("source '{alias}'")));
        }
        let json = fs::read_to_string(&path)
            .map_err(|e| Error::Storage(format!("Failed to read {DOCUMENT_FILE}: {e}")))?;
        serde_json::from_str(&json)
            .map_err(|e| Error::Storage(format!("Failed to parse {DOCUMENT_FILE}: {e}")))
    }

    /// Saves source metadata
    pub fn save_meta(&self, alias: &str, meta: &SourceMeta) -> Result<()> {
        self.ensure_source_dir(alias)?;
        let json = serde_json::to_string_pretty(meta)
            .map_err(|e| Error::Storage(format!("Failed to serialize metadata: {e}")))?;
        write_atomic(&self.metadata_path(alias)?, json.as_bytes())?;
        debug!("Saved {METADATA_FILE} for {alias}");
        Ok(())
    }

    /// Loads source metadata, `None` if absent
    pub fn load_meta(&self, alias: &str) -> Result<Option<SourceMeta>> {
        let path = self.metadata_path(alias)?;
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)
            .map_err(|e| Error::Storage(format!("Failed to read metadata: {e}")))?;
        let meta = serde_json::from_str(&json)
            .map_err(|e| Error::Storage(format!("Failed to parse metadata: {e}")))?;
        Ok(Some(meta))
    }

    /// Checks if a source exists in storage
    #[must_use]
    pub fn exists(&self, alias: &str) -> bool {
        self.document_path(alias)
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Lists all stored aliases, sorted
    #[must_use]
    pub fn list_sources(&self) -> Vec<String> {
        let mut sources = Vec::new();
        if let Ok(entries) = fs::read_dir(self.root_dir.join("sources")) {
            for entry in entries.flatten() {
                if !entry.path().is_dir() {
                    continue;
                }
                if let Some(name) = entry.file_name().to_str() {
                    if !name.starts_with('.') && self.exists(name) {
                        sources.push(name.to_string());
                    }
                }
            }
        }
        sources.sort();
        sources
    }

    /// Removes a source directory including its index and archives
    pub fn remove(&self, alias: &str) -> Result<()> {
        let dir = self.source_dir(alias)?;
        if !dir.exists() {
            return Err(Error::NotFound(format!("source '{alias}'")));
        }
        fs::remove_dir_all(&dir)
            .map_err(|e| Error::Storage(format!("Failed to remove source directory: {e}")))?;
        info!("Removed {alias}");
        Ok(())
    }

    /// Copies the current raw file into the archive directory.
    ///
    /// Returns the archived path, or `None` when there was nothing to archive.
    pub fn archive(&self, alias: &str) -> Result<Option<PathBuf>> {
        let raw = self.raw_path(alias)?;
        if !raw.exists() {
            return Ok(None);
        }

        let archive_dir = self.archive_dir(alias)?;
        fs::create_dir_all(&archive_dir)
            .map_err(|e| Error::Storage(format!("Failed to create archive directory: {e}")))?;

        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S%.3fZ").to_string();
        let target = claim_archive_slot(&archive_dir, &timestamp)?;
        fs::copy(&raw, &target)
            .map_err(|e| Error::Storage(format!("Failed to archive {}: {e}", raw.display())))?;

        info!("Archived {alias} at {timestamp}");
        Ok(Some(target))
    }

    /// Archived raw builds, oldest first.
    pub fn list_archives(&self, alias: &str) -> Result<Vec<PathBuf>> {
        let dir = self.archive_dir(alias)?;
        let mut archives: Vec<PathBuf> = match fs::read_dir(&dir) {
            Ok(entries) => entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| {
                    p.is_file()
                        && p.file_name()
                            .and_then(|n| n.to_str())
                            .is_some_and(|n| n.ends_with(RAW_FILE))
                })
                .collect(),
            Err(_) => Vec::new(),
        };
        // Timestamps sort lexically.
        archives.sort();
        Ok(archives)
    }
}

/// Create an empty archive file named after `timestamp`. Archives taken in
/// the same millisecond get a `.NNN` suffix, which still sorts after the
/// bare name.
fn claim_archive_slot(dir: &Path, timestamp: &str) -> Result<PathBuf> {
    for attempt in 0..1000u32 {
        let name = if attempt == 0 {
            format!("{timestamp}-{RAW_FILE}")
        } else {
            format!("{timestamp}.{attempt:03}-{RAW_FILE}")
        };
        let target = dir.join(name);
        match fs::OpenOptions::new().write(true).create_new(true).open(&target) {
            Ok(_) => return Ok(target),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {},
            Err(e) => {
                return Err(Error::Storage(format!(
                    "Failed to create archive {}: {e}",
                    target.display()
                )));
            },
        }
    }
    Err(Error::Storage(format!(
        "Too many archives for {timestamp} in {}",
        dir.display()
    )))
}

fn env_dir(var: &str) -> Option<PathBuf> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::Storage(format!("Invalid path {}", path.display())))?;
    let tmp_path = path.with_file_name(format!("{file_name}.tmp"));

    fs::write(&tmp_path, bytes)
        .map_err(|e| Error::Storage(format!("Failed to write {file_name}: {e}")))?;

    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path)
            .map_err(|e| Error::Storage(format!("Failed to remove existing {file_name}: {e}")))?;
    }

    fs::rename(&tmp_path, path)
        .map_err(|e| Error::Storage(format!("Failed to commit {file_name}: {e}")))
}

/// Validate that an alias is safe to use as a directory name.
pub fn validate_alias(alias: &str) -> Result<()> {
    let reject = |reason: &str| {
        Err(Error::InvalidAlias {
            alias: alias.to_string(),
            reason: reason.to_string(),
        })
    };

    if alias.is_empty() {
        return reject("cannot be empty");
    }
    if alias.starts_with('-') {
        return reject("cannot start with '-'");
    }
    if alias.contains("..") || alias.contains('/') || alias.contains('\\') {
        return reject("contains path traversal characters");
    }
    if alias.len() > MAX_ALIAS_LEN {
        return reject(&format!(
            "exceeds maximum length of {MAX_ALIAS_LEN} characters"
        ));
    }
    if !alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return reject("only [A-Za-z0-9_-] are allowed");
    }
    Ok(())
}
