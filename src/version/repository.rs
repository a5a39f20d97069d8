//! Repository trait for fetching version metadata from an update site

#[cfg(test)]
use mockall::automock;

use reqwest::Url;

use crate::version::error::RepositoryError;
use crate::version::types::RepositoryMetadata;

/// Trait for fetching version metadata from an update site
///
/// Implementations read the metadata fresh on every call and must not
/// register the endpoint in any shared state.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    /// Fetches the metadata published at `endpoint`
    ///
    /// # Returns
    /// * `Ok(RepositoryMetadata)` - Entries in published order
    /// * `Err(RepositoryError::Unreachable)` - The endpoint could not be contacted
    /// * `Err(RepositoryError::MalformedMetadata)` - The payload could not be parsed
    async fn fetch(&self, endpoint: &Url) -> Result<RepositoryMetadata, RepositoryError>;
}
