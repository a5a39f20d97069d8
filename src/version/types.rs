//! Common types shared by the repository client, installed-state reader and checker

use serde::Deserialize;
use thiserror::Error;

use crate::version::error::{InstalledStateError, RepositoryError, VersionError};
use crate::version::semver::VersionString;

/// One `(component, version)` pair as published by a repository or profile
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ComponentEntry {
    pub id: String,
    pub version: String,
}

/// Version metadata fetched from an update site.
///
/// Entries keep their published order and raw version text; versions are
/// parsed only when a component is looked up.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryMetadata {
    #[serde(rename = "components")]
    pub entries: Vec<ComponentEntry>,
}

impl RepositoryMetadata {
    pub fn new(entries: Vec<ComponentEntry>) -> Self {
        Self { entries }
    }

    /// Parse a metadata document
    pub fn from_slice(bytes: &[u8]) -> Result<Self, RepositoryError> {
        serde_json::from_slice(bytes).map_err(|e| RepositoryError::MalformedMetadata(e.to_string()))
    }

    /// Returns the newest published version of a component.
    ///
    /// `None` if the repository does not list the component at all. Every
    /// listed version of the component must parse.
    pub fn latest_version(
        &self,
        component_id: &str,
    ) -> Option<Result<VersionString, VersionError>> {
        let mut latest: Option<VersionString> = None;

        for entry in self.entries.iter().filter(|entry| entry.id == component_id) {
            let version = match entry.version.parse::<VersionString>() {
                Ok(version) => version,
                Err(e) => return Some(Err(e)),
            };
            if latest.as_ref().is_none_or(|current| version > *current) {
                latest = Some(version);
            }
        }

        latest.map(Ok)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Why a check could not produce a verdict
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckFailure {
    /// The update site could not be contacted
    #[error("repository unreachable: {0}")]
    Unreachable(String),
    /// The update site answered with something that is not metadata
    #[error("malformed metadata: {0}")]
    MalformedMetadata(String),
    /// An installed or published version could not be parsed
    #[error("invalid version: {0:?}")]
    InvalidVersion(String),
    /// The local installation registry could not be read
    #[error("installed state unreadable: {0}")]
    InstalledState(String),
}

impl From<RepositoryError> for CheckFailure {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Unreachable(reason) => CheckFailure::Unreachable(reason),
            RepositoryError::MalformedMetadata(reason) => CheckFailure::MalformedMetadata(reason),
        }
    }
}

impl From<VersionError> for CheckFailure {
    fn from(e: VersionError) -> Self {
        match e {
            VersionError::InvalidVersion(version) => CheckFailure::InvalidVersion(version),
        }
    }
}

impl From<InstalledStateError> for CheckFailure {
    fn from(e: InstalledStateError) -> Self {
        match e {
            InstalledStateError::Version(e) => e.into(),
            other => CheckFailure::InstalledState(other.to_string()),
        }
    }
}

/// Outcome of a single update check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    UpToDate,
    UpdateAvailable,
    /// The component is unknown to the installation or to the repository
    NotFound,
    CheckFailed(CheckFailure),
}

/// Decision record produced once per check and handed to a notifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDecision {
    pub component_id: String,
    /// `None` when the component is not installed or the installed state could not be read
    pub installed_version: Option<VersionString>,
    /// Set only for `UpdateAvailable`
    pub available_version: Option<VersionString>,
    pub status: UpdateStatus,
}

impl UpdateDecision {
    pub fn up_to_date(component_id: &str, installed: VersionString) -> Self {
        Self {
            component_id: component_id.to_string(),
            installed_version: Some(installed),
            available_version: None,
            status: UpdateStatus::UpToDate,
        }
    }

    pub fn update_available(
        component_id: &str,
        installed: VersionString,
        available: VersionString,
    ) -> Self {
        Self {
            component_id: component_id.to_string(),
            installed_version: Some(installed),
            available_version: Some(available),
            status: UpdateStatus::UpdateAvailable,
        }
    }

    pub fn not_found(component_id: &str, installed: Option<VersionString>) -> Self {
        Self {
            component_id: component_id.to_string(),
            installed_version: installed,
            available_version: None,
            status: UpdateStatus::NotFound,
        }
    }

    pub fn failed(
        component_id: &str,
        installed: Option<VersionString>,
        reason: impl Into<CheckFailure>,
    ) -> Self {
        Self {
            component_id: component_id.to_string(),
            installed_version: installed,
            available_version: None,
            status: UpdateStatus::CheckFailed(reason.into()),
        }
    }

    pub fn is_update_available(&self) -> bool {
        self.status == UpdateStatus::UpdateAvailable
    }
}
