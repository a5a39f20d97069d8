use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use clap::Parser;
use tracing::error;

use bundle_updater::config::{UpdaterConfig, log_path};
use bundle_updater::logging::{self, LogTarget};
use bundle_updater::notify::surface::surface_channel;
use bundle_updater::startup::on_application_start;

#[derive(Parser)]
#[command(name = "bundle-updater")]
#[command(version, about = "Check an update site for a newer version of an installed component")]
struct Cli {
    /// JSON config file (defaults to config.json in the data directory)
    #[arg(long, env = "BUNDLE_UPDATER_CONFIG")]
    config: Option<PathBuf>,

    /// Update site URI
    #[arg(long, env = "BUNDLE_UPDATER_ENDPOINT")]
    endpoint: Option<String>,

    /// Component identifier to check
    #[arg(long, env = "BUNDLE_UPDATER_COMPONENT")]
    component: Option<String>,

    /// Profile file listing installed components
    #[arg(long, env = "BUNDLE_UPDATER_PROFILE")]
    profile: Option<PathBuf>,

    /// Installed version of the component
    #[arg(long, env = "BUNDLE_UPDATER_INSTALLED_VERSION")]
    installed_version: Option<String>,

    /// Repository fetch timeout in milliseconds
    #[arg(long, env = "BUNDLE_UPDATER_FETCH_TIMEOUT")]
    fetch_timeout: Option<u64>,

    /// Command to run when an update is available
    #[arg(long, num_args = 1.., allow_hyphen_values = true)]
    update_command: Option<Vec<String>>,

    /// Write logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Write logs to stderr instead of the log file
    #[arg(long)]
    log_stderr: bool,
}

impl Cli {
    fn overrides(&self) -> UpdaterConfig {
        UpdaterConfig {
            endpoint: self.endpoint.clone(),
            component_id: self.component.clone(),
            profile: self.profile.clone(),
            installed_version: self.installed_version.clone(),
            fetch_timeout: self.fetch_timeout,
            update_command: self.update_command.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_file = log_path();
    let target = if cli.log_stderr {
        LogTarget::Stderr
    } else {
        LogTarget::File(&log_file)
    };
    let _guard = match logging::init(target, cli.log_json) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("bundle-updater: {}", e);
            None
        }
    };

    let settings = match UpdaterConfig::load_or_default(cli.config.as_deref())
        .and_then(|config| config.merge(cli.overrides()).resolve())
    {
        Ok(settings) => settings,
        Err(e) => {
            error!("Skipping update check: {}", e);
            return;
        }
    };

    let (surface, surface_loop) = surface_channel();
    let worker = match thread::Builder::new()
        .name("update-check".to_string())
        .spawn(move || on_application_start(settings, Arc::new(surface)))
    {
        Ok(worker) => worker,
        Err(e) => {
            error!("Failed to start update check thread: {}", e);
            return;
        }
    };

    surface_loop.run();

    if worker.join().is_err() {
        error!("Update check thread panicked");
    }
}
