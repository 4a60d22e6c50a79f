//! Resolution of specification selections into specification text

use super::SpecSource;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Fetches remote specification documents
#[async_trait]
pub trait SpecFetcher: Send + Sync {
    /// Fetch the document at `url` as text. Non-2xx responses are network errors.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// `SpecFetcher` backed by a reqwest client
pub struct HttpSpecFetcher {
    client: Client,
}

impl HttpSpecFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SpecFetcher for HttpSpecFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!(url, "Fetching specification");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to fetch {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!(
                "Failed to fetch {url}: HTTP status {status}"
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read body of {url}: {e}")))
    }
}

/// In-memory `SpecFetcher` for tests
#[derive(Default)]
pub struct MockSpecFetcher {
    pub documents: HashMap<String, String>,
    /// Urls requested so far, in order
    pub requested: Arc<Mutex<Vec<String>>>,
}

impl MockSpecFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_document(mut self, url: &str, body: &str) -> Self {
        self.documents.insert(url.to_string(), body.to_string());
        self
    }
}

#[async_trait]
impl SpecFetcher for MockSpecFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.requested.lock().await.push(url.to_string());
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Network(format!("Failed to fetch {url}: HTTP status 404 Not Found")))
    }
}

/// Raw download URL of a CAMARA definition
pub fn camara_raw_url(raw_base: &str, repo: &str, path: &str) -> String {
    format!(
        "{}/{}/main/{}",
        raw_base.trim_end_matches('/'),
        repo,
        path.trim_start_matches('/')
    )
}

/// Read or fetch the text of a selected specification.
///
/// Files are read relative to the process working directory; URLs and CAMARA
/// definitions go through `fetcher`.
pub async fn resolve_spec_text(
    source: &SpecSource,
    fetcher: &dyn SpecFetcher,
    camara_raw_base: &str,
) -> Result<String> {
    let text = match source {
        SpecSource::File { path, .. } => tokio::fs::read_to_string(path).await?,
        SpecSource::Url { url, .. } => fetcher.fetch(url).await?,
        SpecSource::Camara { path, repo, .. } => {
            fetcher
                .fetch(&camara_raw_url(camara_raw_base, repo, path))
                .await?
        }
    };
    info!(
        spec = %source.display_name(),
        bytes = text.len(),
        "Resolved specification"
    );
    Ok(text)
}
