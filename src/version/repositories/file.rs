//! Local `file:` update site implementation

use reqwest::Url;
use tracing::debug;

use crate::version::error::RepositoryError;
use crate::version::repositories::metadata_url;
use crate::version::repository::Repository;
use crate::version::types::RepositoryMetadata;

/// Repository implementation for update sites on the local filesystem
#[derive(Debug, Default)]
pub struct FileRepository;

#[async_trait::async_trait]
impl Repository for FileRepository {
    async fn fetch(&self, endpoint: &Url) -> Result<RepositoryMetadata, RepositoryError> {
        let url = metadata_url(endpoint)?;
        let path = url
            .to_file_path()
            .map_err(|_| RepositoryError::Unreachable(format!("{} is not a local path", url)))?;

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| RepositoryError::Unreachable(format!("{}: {}", path.display(), e)))?;
        debug!("Read {} bytes of metadata from {}", bytes.len(), path.display());

        RepositoryMetadata::from_slice(&bytes)
    }
}
