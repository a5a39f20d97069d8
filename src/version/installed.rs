//! Installed-state readers
//!
//! Report which version of a component the local installation currently has.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use tracing::debug;

use crate::version::error::InstalledStateError;
use crate::version::semver::{VersionString, parse_version};
use crate::version::types::ComponentEntry;

/// Trait for querying the local installation registry
///
/// Reads may block on local I/O.
#[cfg_attr(test, automock)]
pub trait InstalledState: Send + Sync + 'static {
    /// Get the installed version of a component
    fn current_version(&self, component_id: &str) -> Result<VersionString, InstalledStateError>;
}

/// Installed state held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticInstalledState {
    versions: HashMap<String, String>,
}

impl StaticInstalledState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, component_id: &str, version: &str) -> Self {
        self.versions
            .insert(component_id.to_string(), version.to_string());
        self
    }
}

impl InstalledState for StaticInstalledState {
    fn current_version(&self, component_id: &str) -> Result<VersionString, InstalledStateError> {
        let version = self
            .versions
            .get(component_id)
            .ok_or_else(|| InstalledStateError::NotInstalled(component_id.to_string()))?;

        Ok(parse_version(version)?)
    }
}

#[derive(Debug, Deserialize)]
struct ProfileDocument {
    components: Vec<ComponentEntry>,
}

/// Installed state recorded in a JSON profile file.
///
/// The file is read on every query.
#[derive(Debug, Clone)]
pub struct ProfileFile {
    path: PathBuf,
}

impl ProfileFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<ProfileDocument, InstalledStateError> {
        let content = std::fs::read(&self.path).map_err(|e| self.unreadable(e))?;
        serde_json::from_slice(&content).map_err(|e| self.unreadable(e))
    }

    fn unreadable(&self, e: impl std::fmt::Display) -> InstalledStateError {
        InstalledStateError::Unreadable(format!("{}: {}", self.path.display(), e))
    }
}

impl InstalledState for ProfileFile {
    fn current_version(&self, component_id: &str) -> Result<VersionString, InstalledStateError> {
        let profile = self.read()?;
        debug!(
            "Profile {} lists {} components",
            self.path.display(),
            profile.components.len()
        );

        let entry = profile
            .components
            .iter()
            .find(|entry| entry.id == component_id)
            .ok_or_else(|| InstalledStateError::NotInstalled(component_id.to_string()))?;

        Ok(parse_version(&entry.version)?)
    }
}
