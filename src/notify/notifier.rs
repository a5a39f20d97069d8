//! Notifiers receive the decision of each check exactly once

use std::fmt;
use std::process::{Command, ExitStatus};
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::notify::surface::Surface;
use crate::version::semver::VersionString;
use crate::version::types::{UpdateDecision, UpdateStatus};

/// Environment variable carrying the checked component id to the update command
pub const ENV_COMPONENT: &str = "BUNDLE_UPDATER_COMPONENT";
/// Environment variable carrying the installed version to the update command
pub const ENV_INSTALLED_VERSION: &str = "BUNDLE_UPDATER_INSTALLED_VERSION";
/// Environment variable carrying the available version to the update command
pub const ENV_AVAILABLE_VERSION: &str = "BUNDLE_UPDATER_AVAILABLE_VERSION";

/// Trait for surfacing an update decision
#[cfg_attr(test, automock)]
pub trait Notifier: Send + Sync {
    /// Hand the decision off; the return carries nothing of interest
    fn notify(&self, decision: UpdateDecision);
}

/// Notifier that only reports decisions to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, decision: UpdateDecision) {
        log_decision(&decision);
    }
}

fn log_decision(decision: &UpdateDecision) {
    let installed = decision
        .installed_version
        .as_ref()
        .map_or_else(|| "-".to_string(), |v| v.to_string());

    match &decision.status {
        UpdateStatus::UpdateAvailable => info!(
            "Update available for {}: {} -> {}",
            decision.component_id,
            installed,
            version_or_empty(decision.available_version.as_ref())
        ),
        UpdateStatus::UpToDate => {
            info!("{} {} is up to date", decision.component_id, installed)
        }
        UpdateStatus::NotFound => warn!(
            "{} was not found in the installation or on the update site",
            decision.component_id
        ),
        UpdateStatus::CheckFailed(reason) => error!(
            "Checking {} for updates failed: {}",
            decision.component_id, reason
        ),
    }
}

/// Program and arguments run when an update is available
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Build from an argv list; `None` if it is empty
    pub fn from_argv(argv: Vec<String>) -> Option<Self> {
        let mut argv = argv.into_iter();
        let program = argv.next().filter(|p| !p.trim().is_empty())?;
        Some(Self {
            program,
            args: argv.collect(),
        })
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Running the update command failed
#[derive(Debug, Error)]
#[error("Command `{command}` {reason}")]
pub struct CommandExecutionError {
    pub command: String,
    pub reason: CommandFailure,
}

#[derive(Debug, Error)]
pub enum CommandFailure {
    #[error("could not be started: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("exited with {0}")]
    Exit(ExitStatus),
}

/// Run the update command for a decision, waiting for it to exit
pub fn run_update_command(
    command: &CommandSpec,
    decision: &UpdateDecision,
) -> Result<(), CommandExecutionError> {
    let failed = |reason| CommandExecutionError {
        command: command.to_string(),
        reason,
    };

    let status = Command::new(&command.program)
        .args(&command.args)
        .env(ENV_COMPONENT, &decision.component_id)
        .env(ENV_INSTALLED_VERSION, version_or_empty(decision.installed_version.as_ref()))
        .env(ENV_AVAILABLE_VERSION, version_or_empty(decision.available_version.as_ref()))
        .status()
        .map_err(|e| failed(CommandFailure::Spawn(e)))?;

    if !status.success() {
        return Err(failed(CommandFailure::Exit(status)));
    }

    info!("Update command `{}` finished", command);
    Ok(())
}

fn version_or_empty(version: Option<&VersionString>) -> String {
    version.map(|v| v.to_string()).unwrap_or_default()
}

/// Notifier that runs a command on the surface thread when an update is available.
///
/// Every decision is logged as well.
pub struct CommandNotifier {
    command: CommandSpec,
    surface: Arc<dyn Surface>,
}

impl CommandNotifier {
    pub fn new(command: CommandSpec, surface: Arc<dyn Surface>) -> Self {
        Self { command, surface }
    }
}

impl Notifier for CommandNotifier {
    fn notify(&self, decision: UpdateDecision) {
        log_decision(&decision);

        if !decision.is_update_available() {
            return;
        }

        let command = self.command.clone();
        self.surface.run(Box::new(move || {
            if let Err(e) = run_update_command(&command, &decision) {
                error!("Failed to open the update prompt: {}", e);
            }
        }));
    }
}
