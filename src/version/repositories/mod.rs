//! Repository implementations for fetching update site metadata

pub mod file;
pub mod http;

pub use file::FileRepository;
pub use http::HttpRepository;

use std::time::Duration;

use reqwest::Url;

use crate::version::error::RepositoryError;
use crate::version::repository::Repository;
use crate::version::types::RepositoryMetadata;

/// Name of the metadata document inside an update site directory
pub const METADATA_FILE_NAME: &str = "updates.json";

/// Resolve the metadata document for an endpoint.
///
/// Endpoints whose path ends with `/` are update site directories and
/// get [`METADATA_FILE_NAME`] appended; anything else already names the document.
pub fn metadata_url(endpoint: &Url) -> Result<Url, RepositoryError> {
    if endpoint.path().ends_with('/') {
        endpoint
            .join(METADATA_FILE_NAME)
            .map_err(|e| RepositoryError::Unreachable(format!("{}: {}", endpoint, e)))
    } else {
        Ok(endpoint.clone())
    }
}

/// Repository that picks the transport from the endpoint scheme
pub struct UpdateSiteRepository {
    http: HttpRepository,
    file: FileRepository,
}

impl UpdateSiteRepository {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: HttpRepository::new(timeout),
            file: FileRepository,
        }
    }
}

impl Default for UpdateSiteRepository {
    fn default() -> Self {
        Self {
            http: HttpRepository::default(),
            file: FileRepository,
        }
    }
}

#[async_trait::async_trait]
impl Repository for UpdateSiteRepository {
    async fn fetch(&self, endpoint: &Url) -> Result<RepositoryMetadata, RepositoryError> {
        match endpoint.scheme() {
            "http" | "https" => self.http.fetch(endpoint).await,
            "file" => self.file.fetch(endpoint).await,
            scheme => Err(RepositoryError::Unreachable(format!(
                "Unsupported scheme {:?} in {}",
                scheme, endpoint
            ))),
        }
    }
}
