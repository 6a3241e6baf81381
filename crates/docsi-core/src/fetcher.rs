//! HTTP retrieval of published search indexes.

use crate::{Error, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::header::{ETAG, HeaderMap, HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use reqwest::{Client, StatusCode};
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, info};

/// HTTP client for published `search_index.js` files, with conditional
/// request support.
pub struct Fetcher {
    client: Client,
}

/// Result of a conditional fetch.
#[derive(Debug)]
pub enum FetchResult {
    /// The server answered 304; carries any refreshed validators.
    NotModified {
        etag: Option<String>,
        last_modified: Option<String>,
    },
    /// A new body.
    Modified {
        content: String,
        etag: Option<String>,
        last_modified: Option<String>,
        /// Base64 `SHA256` of the body.
        sha256: String,
    },
}

impl Fetcher {
    /// A client with a 30 second timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// A client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("docsi/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(Error::Network)?;
        Ok(Self { client })
    }

    /// Fetch `url`, sending `If-None-Match` / `If-Modified-Since` when the
    /// previous validators are known.
    pub async fn fetch_with_cache(
        &self,
        url: &str,
        etag: Option<&str>,
        last_modified: Option<&str>,
    ) -> Result<FetchResult> {
        let mut request = self.client.get(url);

        if let Some(tag) = etag {
            debug!("Setting If-None-Match: {}", tag);
            request = request.header(IF_NONE_MATCH, tag);
        }
        if let Some(lm) = last_modified {
            debug!("Setting If-Modified-Since: {}", lm);
            request = request.header(IF_MODIFIED_SINCE, lm);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_MODIFIED {
            info!("Search index not modified (304) for {}", url);
            let (etag, last_modified) = validators(response.headers());
            return Ok(FetchResult::NotModified {
                etag,
                last_modified,
            });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!(
                "No search index at '{url}'. Documenter publishes it as <site>/search_index.js"
            )));
        }
        let response = response.error_for_status()?;

        let (etag, last_modified) = validators(response.headers());
        let content = response.text().await?;
        let sha256 = calculate_sha256(&content);

        info!("Fetched {} bytes from {}", content.len(), url);
        Ok(FetchResult::Modified {
            content,
            etag,
            last_modified,
            sha256,
        })
    }

    /// Unconditional fetch returning the body and its checksum.
    pub async fn fetch(&self, url: &str) -> Result<(String, String)> {
        match self.fetch_with_cache(url, None, None).await? {
            FetchResult::Modified {
                content, sha256, ..
            } => Ok((content, sha256)),
            FetchResult::NotModified { .. } => Err(Error::Parse(format!(
                "Server answered 304 to an unconditional request for {url}"
            ))),
        }
    }
}

fn validators(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let get = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };
    (get(ETAG), get(LAST_MODIFIED))
}

/// Base64 `SHA256` digest, as stored in [`crate::SourceMeta::sha256`].
#[must_use]
pub fn calculate_sha256(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    STANDARD.encode(hasher.finalize())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    const BODY: &str = "var documenterSearchIndex = {\"docs\":\n[]\n}\n";

    #[test]
    fn test_sha256_is_stable_base64() {
        let digest = calculate_sha256("");
        assert_eq!(digest, "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=");
        assert_ne!(calculate_sha256(BODY), digest);
    }

    #[tokio::test]
    async fn test_fetch_modified_returns_validators() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dev/search_index.js"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(BODY)
                    .insert_header("etag", "\"v2\"")
                    .insert_header("last-modified", "Wed, 21 Oct 2015 07:28:00 GMT"),
            )
            .mount(&server)
            .await;

        let fetcher = Fetcher::new()?;
        let url = format!("{}/dev/search_index.js", server.uri());
        match fetcher.fetch_with_cache(&url, None, None).await? {
            FetchResult::Modified {
                content,
                etag,
                last_modified,
                sha256,
            } => {
                assert_eq!(content, BODY);
                assert_eq!(etag.as_deref(), Some("\"v2\""));
                assert_eq!(
                    last_modified.as_deref(),
                    Some("Wed, 21 Oct 2015 07:28:00 GMT")
                );
                assert_eq!(sha256, calculate_sha256(BODY));
            },
            other => panic!("expected Modified, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_not_modified_with_matching_etag() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search_index.js"))
            .and(header("If-None-Match", "\"v1\""))
            .respond_with(ResponseTemplate::new(304).insert_header("etag", "\"v1\""))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new()?;
        let url = format!("{}/search_index.js", server.uri());
        let result = fetcher.fetch_with_cache(&url, Some("\"v1\""), None).await?;
        assert!(matches!(
            result,
            FetchResult::NotModified { etag: Some(ref tag), .. } if tag == "\"v1\""
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_404_maps_to_not_found() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new()?;
        let url = format!("{}/missing/search_index.js", server.uri());
        match fetcher.fetch(&url).await {
            Err(Error::NotFound(msg)) => assert!(msg.contains("search_index.js")),
            other => panic!("expected NotFound, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_500_is_network_error() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new()?;
        let result = fetcher.fetch(&format!("{}/x", server.uri())).await;
        let err = result.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        assert!(err.is_recoverable());
        Ok(())
    }
}
