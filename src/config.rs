use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

use crate::notify::notifier::CommandSpec;

/// Timeout for repository fetches in milliseconds (30 seconds)
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;

/// Updater configuration structure
///
/// Every field may be omitted; `resolve` decides what is actually required.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdaterConfig {
    /// Update site URI, either a site directory (trailing `/`) or a metadata document
    pub endpoint: Option<String>,
    /// Identifier of the component to check
    pub component_id: Option<String>,
    /// Profile file listing installed components
    pub profile: Option<PathBuf>,
    /// Installed version, used instead of a profile file
    pub installed_version: Option<String>,
    /// Repository fetch timeout in milliseconds
    pub fetch_timeout: Option<u64>,
    /// Command run on the surface thread when an update is available
    pub update_command: Option<Vec<String>>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("No update site endpoint configured")]
    MissingEndpoint,

    #[error("No component id configured")]
    MissingComponent,

    #[error("Neither a profile file nor an installed version is configured")]
    MissingInstalledState,

    #[error("Invalid update site URI {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Update command must name a program")]
    EmptyCommand,

    #[error("Fetch timeout must be greater than zero")]
    ZeroTimeout,
}

/// Where the installed version comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstalledSource {
    Profile(PathBuf),
    Version(String),
}

/// Validated settings for one start-up check
#[derive(Debug, Clone, PartialEq)]
pub struct CheckSettings {
    pub endpoint: Url,
    pub component_id: String,
    pub installed: InstalledSource,
    pub fetch_timeout: Duration,
    pub update_command: Option<CommandSpec>,
}

impl UpdaterConfig {
    /// Load a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` if given, else the default config file if it exists, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = config_path();
                if default_path.is_file() {
                    Self::load(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Overlay every value set in `overrides` on top of `self`
    pub fn merge(self, overrides: UpdaterConfig) -> Self {
        Self {
            endpoint: overrides.endpoint.or(self.endpoint),
            component_id: overrides.component_id.or(self.component_id),
            profile: overrides.profile.or(self.profile),
            installed_version: overrides.installed_version.or(self.installed_version),
            fetch_timeout: overrides.fetch_timeout.or(self.fetch_timeout),
            update_command: overrides.update_command.or(self.update_command),
        }
    }

    /// Validate into the settings of a check
    ///
    /// An installed version takes precedence over a profile file.
    pub fn resolve(self) -> Result<CheckSettings, ConfigError> {
        let endpoint = self
            .endpoint
            .filter(|e| !e.trim().is_empty())
            .ok_or(ConfigError::MissingEndpoint)?;
        let endpoint = Url::parse(endpoint.trim()).map_err(|e| ConfigError::InvalidEndpoint {
            reason: e.to_string(),
            endpoint,
        })?;

        let component_id = self
            .component_id
            .filter(|c| !c.trim().is_empty())
            .ok_or(ConfigError::MissingComponent)?;

        let installed = match (self.installed_version, self.profile) {
            (Some(version), _) => InstalledSource::Version(version),
            (None, Some(profile)) => InstalledSource::Profile(profile),
            (None, None) => return Err(ConfigError::MissingInstalledState),
        };

        let update_command = self
            .update_command
            .map(|argv| CommandSpec::from_argv(argv).ok_or(ConfigError::EmptyCommand))
            .transpose()?;

        let fetch_timeout = match self.fetch_timeout.unwrap_or(DEFAULT_FETCH_TIMEOUT_MS) {
            0 => return Err(ConfigError::ZeroTimeout),
            ms => Duration::from_millis(ms),
        };

        Ok(CheckSettings {
            endpoint,
            component_id,
            installed,
            fetch_timeout,
            update_command,
        })
    }
}

/// Returns the path to the data directory for bundle-updater.
/// Uses $XDG_DATA_HOME/bundle-updater if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/bundle-updater,
/// or ./bundle-updater if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the default config file.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("bundle-updater.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("bundle-updater")
}
