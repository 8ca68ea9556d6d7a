//! Transport shared by the membership and key-bundle sources

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use crate::{Error, Result};

const USER_AGENT: &str = concat!("prr-sync/", env!("CARGO_PKG_VERSION"));

/// Retrieves the raw bytes behind a source URL.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Fetches `http(s)://` URLs with reqwest and `file://` URLs or bare
/// paths from the local filesystem.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::network(url, e))?
            .error_for_status()
            .map_err(|e| Error::network(url, e))?;

        let body = response.bytes().await.map_err(|e| Error::network(url, e))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        match local_path(url)? {
            Some(path) => {
                debug!(path = %path.display(), "Reading local source");
                tokio::fs::read(&path)
                    .await
                    .map_err(|e| Error::network(url, e))
            }
            None => {
                debug!(%url, "Fetching remote source");
                self.fetch_remote(url).await
            }
        }
    }
}

/// Resolve `file://` URLs and bare paths; `None` means a network URL.
fn local_path(url: &str) -> Result<Option<PathBuf>> {
    if url.starts_with("file:") {
        let parsed = Url::parse(url).map_err(|e| Error::network(url, e))?;
        let path = parsed
            .to_file_path()
            .map_err(|()| Error::network(url, "not a local file URL"))?;
        return Ok(Some(path));
    }
    if url.contains("://") {
        return Ok(None);
    }
    Ok(Some(PathBuf::from(url)))
}
