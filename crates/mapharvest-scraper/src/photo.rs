//! Representative photo download.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::DownloadError;
use crate::rate_limit::retry_with_backoff;

/// URL fragments of the site's generic placeholder imagery.
const PLACEHOLDER_MARKERS: [&str; 2] = ["gstatic", "streetviewpixels"];

/// Returns `true` when `url` points at placeholder imagery rather than a
/// photo of the place.
#[must_use]
pub fn is_placeholder(url: &str) -> bool {
    PLACEHOLDER_MARKERS.iter().any(|marker| url.contains(marker))
}

/// Downloads place photos over HTTP with retry on transient failures.
#[derive(Debug, Clone)]
pub struct PhotoDownloader {
    client: reqwest::Client,
    max_retries: u32,
    backoff_base: Duration,
}

impl PhotoDownloader {
    /// # Errors
    ///
    /// Returns [`DownloadError::Http`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration, max_retries: u32) -> Result<Self, DownloadError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base: Duration::from_secs(1),
        })
    }

    #[must_use]
    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    /// Save the image at `url` to `<dir>/<stem>.jpg`.
    ///
    /// Returns `Ok(None)` without any request when `url` is a placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] when the request keeps failing or the file
    /// cannot be written.
    pub async fn download(
        &self,
        url: &str,
        dir: &Path,
        stem: &str,
    ) -> Result<Option<PathBuf>, DownloadError> {
        if is_placeholder(url) {
            tracing::debug!(url, "skipping placeholder photo");
            return Ok(None);
        }

        let bytes = retry_with_backoff(self.max_retries, self.backoff_base, || {
            self.fetch(url)
        })
        .await?;

        let path = dir.join(format!("{stem}.jpg"));
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| DownloadError::Io {
                path: path.display().to_string(),
                source,
            })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "photo saved");
        Ok(Some(path))
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}
