//! User configuration for docsi.
//!
//! Configuration lives in a single TOML file. A missing file means
//! defaults; a present but malformed one is an error.
//!
//! ```toml
//! [paths]
//! root = "/srv/docsi"        # data root, overridden by DOCSI_DATA_DIR
//!
//! [search]
//! default_limit = 10
//! snippet_chars = 160
//!
//! [export]
//! binding = "documenterSearchIndex"
//! ```
//!
//! The file is found at `$DOCSI_CONFIG`, else
//! `$DOCSI_CONFIG_DIR/config.toml`, else `config.toml` in the platform
//! config directory.

use crate::codec::{self, DEFAULT_BINDING};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `[paths]`
    pub paths: PathsConfig,
    /// `[search]`
    pub search: SearchConfig,
    /// `[export]`
    pub export: ExportConfig,
}

/// Storage locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Data root. `None` means the platform default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

/// Search defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Hits returned when `--limit` is not given.
    pub default_limit: usize,
    /// Approximate snippet length in characters.
    pub snippet_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            snippet_chars: 160,
        }
    }
}

/// Export defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Identifier regenerated files bind their data to.
    pub binding: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            binding: DEFAULT_BINDING.to_string(),
        }
    }
}

impl Config {
    /// Load from the resolved config path, falling back to defaults when
    /// the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {e}", path.display())))?;
        config.check()?;
        Ok(config)
    }

    /// Check and write as TOML, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.check()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write {}: {e}", path.display())))
    }

    fn check(&self) -> Result<()> {
        if self.search.default_limit == 0 {
            return Err(Error::Config("search.default_limit must be at least 1".into()));
        }
        if self.search.snippet_chars == 0 {
            return Err(Error::Config("search.snippet_chars must be at least 1".into()));
        }
        if !codec::is_identifier(&self.export.binding) {
            return Err(Error::Config(format!(
                "export.binding `{}` is not a JavaScript identifier",
                self.export.binding
            )));
        }
        Ok(())
    }

    /// Where [`Config::load`] looks.
    pub fn config_path() -> Result<PathBuf> {
        resolve_config_path(
            std::env::var_os("DOCSI_CONFIG").map(PathBuf::from),
            std::env::var_os("DOCSI_CONFIG_DIR").map(PathBuf::from),
        )
    }
}

fn resolve_config_path(file: Option<PathBuf>, dir: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(file) = file.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(file);
    }
    if let Some(dir) = dir.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(dir.join(CONFIG_FILE));
    }
    directories::ProjectDirs::from("dev", "docsi", "docsi")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
        .ok_or_else(|| Error::Config("Failed to determine config directory".into()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.paths.root, None);
        assert_eq!(config.search.default_limit, 10);
        assert_eq!(config.search.snippet_chars, 160);
        assert_eq!(config.export.binding, "documenterSearchIndex");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[search]\ndefault_limit = 25\n").unwrap();

        let config = Config::load_from(&path).expect("load");
        assert_eq!(config.search.default_limit, 25);
        assert_eq!(config.search.snippet_chars, 160);
        assert_eq!(config.export.binding, "documenterSearchIndex");
    }

    #[test]
    fn test_save_and_load_roundtrip() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            paths: PathsConfig {
                root: Some(PathBuf::from("/srv/docsi")),
            },
            search: SearchConfig {
                default_limit: 3,
                snippet_chars: 80,
            },
            export: ExportConfig {
                binding: "searchIndex".into(),
            },
        };
        config.save_to(&path)?;
        assert_eq!(Config::load_from(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        for body in [
            "[search]\ndefault_limit = 0\n",
            "[export]\nbinding = \"not valid\"\n",
            "[search\n",
        ] {
            fs::write(&path, body).unwrap();
            assert!(
                matches!(Config::load_from(&path), Err(Error::Config(_))),
                "{body:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_path_resolution_order() {
        let file = PathBuf::from("/tmp/explicit.toml");
        let dir = PathBuf::from("/tmp/confdir");

        assert_eq!(
            resolve_config_path(Some(file.clone()), Some(dir.clone())).unwrap(),
            file
        );
        assert_eq!(
            resolve_config_path(None, Some(dir.clone())).unwrap(),
            dir.join("config.toml")
        );
        assert_eq!(
            resolve_config_path(Some(PathBuf::new()), Some(dir.clone())).unwrap(),
            dir.join("config.toml")
        );
    }
}
