//! HTTP download of remote documents

use std::time::Duration;

use crate::config::FetchConfig;
use crate::error::{Error, Result};

/// A document downloaded from a URL, named after the last path segment.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Downloads documents over HTTP with a request timeout and a size cap.
#[derive(Debug, Clone)]
pub struct DocumentFetcher {
    client: reqwest::Client,
    max_download_size: usize,
}

impl DocumentFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            max_download_size: config.max_download_size,
        })
    }

    /// Download `url` and return its bytes. Network failures, non-success
    /// statuses, and oversized bodies all surface as fetch errors.
    pub async fn fetch(&self, url: &str) -> Result<FetchedDocument> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::fetch(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(url, format!("HTTP {status}")));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_download_size as u64 {
                return Err(Error::fetch(
                    url,
                    format!(
                        "document is {length} bytes, larger than the {} byte limit",
                        self.max_download_size
                    ),
                ));
            }
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| Error::fetch(url, e.to_string()))?;
        if data.len() > self.max_download_size {
            return Err(Error::fetch(
                url,
                format!(
                    "document is {} bytes, larger than the {} byte limit",
                    data.len(),
                    self.max_download_size
                ),
            ));
        }

        Ok(FetchedDocument {
            filename: filename_from_url(url),
            data: data.to_vec(),
        })
    }
}

/// Last path segment of the URL, without query or fragment. Falls back to
/// "document" when the URL has no usable path.
fn filename_from_url(url: &str) -> String {
    let trimmed = url.split(['?', '#']).next().unwrap_or(url);
    let after_scheme = trimmed
        .split_once("://")
        .map_or(trimmed, |(_, rest)| rest);
    match after_scheme.split_once('/') {
        Some((_, path)) => path
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or("document")
            .to_string(),
        None => "document".to_string(),
    }
}
