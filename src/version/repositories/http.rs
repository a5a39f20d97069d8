//! HTTP(S) update site implementation

use std::time::Duration;

use reqwest::Url;
use tracing::{debug, warn};

use crate::config::DEFAULT_FETCH_TIMEOUT_MS;
use crate::version::error::RepositoryError;
use crate::version::repositories::metadata_url;
use crate::version::repository::Repository;
use crate::version::types::RepositoryMetadata;

/// Repository implementation for update sites served over HTTP
pub struct HttpRepository {
    client: reqwest::Client,
}

impl HttpRepository {
    /// Creates a new HttpRepository whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("bundle-updater")
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }
}

impl Default for HttpRepository {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS))
    }
}

#[async_trait::async_trait]
impl Repository for HttpRepository {
    async fn fetch(&self, endpoint: &Url) -> Result<RepositoryMetadata, RepositoryError> {
        let url = metadata_url(endpoint)?;

        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();

        if !status.is_success() {
            warn!("Update site returned status {}: {}", status, url);
            return Err(RepositoryError::Unreachable(format!(
                "Unexpected status {} from {}",
                status, url
            )));
        }

        let body = response.bytes().await?;
        debug!("Fetched {} bytes of metadata from {}", body.len(), url);

        RepositoryMetadata::from_slice(&body).inspect_err(|e| {
            warn!("Failed to parse metadata from {}: {}", url, e);
        })
    }
}
