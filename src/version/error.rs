use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Repository unreachable: {0}")]
    Unreachable(String),

    #[error("Malformed metadata: {0}")]
    MalformedMetadata(String),
}

impl From<reqwest::Error> for RepositoryError {
    fn from(e: reqwest::Error) -> Self {
        RepositoryError::Unreachable(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("Invalid version: {0:?}")]
    InvalidVersion(String),
}

#[derive(Debug, Error)]
pub enum InstalledStateError {
    #[error("Component not installed: {0}")]
    NotInstalled(String),

    #[error("Installed state unreadable: {0}")]
    Unreadable(String),

    #[error(transparent)]
    Version(#[from] VersionError),
}
