//! Start-up update check
//!
//! Runs a single check when the application launches and hands the decision
//! to a notifier. Nothing here fails the host process.

use std::sync::Arc;
use std::thread;

use reqwest::Url;
use tracing::{error, info};

use crate::config::{CheckSettings, InstalledSource};
use crate::notify::notifier::{CommandNotifier, LogNotifier, Notifier};
use crate::notify::surface::Surface;
use crate::version::checker::UpdateChecker;
use crate::version::installed::{InstalledState, ProfileFile, StaticInstalledState};
use crate::version::repositories::UpdateSiteRepository;

/// Check `component_id` once and deliver the decision to `notifier`
pub async fn run_check(
    checker: &UpdateChecker,
    notifier: &dyn Notifier,
    component_id: &str,
    endpoint: &Url,
) {
    info!("Checking {} for updates of {}", endpoint, component_id);
    let decision = checker.check(component_id, endpoint).await;
    notifier.notify(decision);
}

fn installed_state(settings: &CheckSettings) -> Arc<dyn InstalledState> {
    match &settings.installed {
        InstalledSource::Version(version) => Arc::new(
            StaticInstalledState::new().with_version(&settings.component_id, version),
        ),
        InstalledSource::Profile(path) => Arc::new(ProfileFile::new(path)),
    }
}

fn build_notifier(settings: &CheckSettings, surface: Arc<dyn Surface>) -> Box<dyn Notifier> {
    match &settings.update_command {
        Some(command) => Box::new(CommandNotifier::new(command.clone(), surface)),
        None => Box::new(LogNotifier),
    }
}

/// Application start hook
///
/// Blocks the calling thread (which must not be the surface thread) for the
/// duration of the check. User-facing work is queued on `surface`.
///
/// The check runs on its own runtime. When called from inside a tokio
/// runtime, that runtime lives on a scoped thread so the caller's runtime is
/// never blocked on or dropped from async context.
pub fn on_application_start(settings: CheckSettings, surface: Arc<dyn Surface>) {
    if tokio::runtime::Handle::try_current().is_ok() {
        thread::scope(|scope| {
            scope.spawn(|| check_on_own_runtime(&settings, surface));
        });
    } else {
        check_on_own_runtime(&settings, surface);
    }
}

fn check_on_own_runtime(settings: &CheckSettings, surface: Arc<dyn Surface>) {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start runtime for the update check: {}", e);
            return;
        }
    };

    let repository = Arc::new(UpdateSiteRepository::new(settings.fetch_timeout));
    let checker = UpdateChecker::new(installed_state(settings), repository)
        .with_fetch_timeout(settings.fetch_timeout);
    let notifier = build_notifier(settings, surface);

    runtime.block_on(run_check(
        &checker,
        notifier.as_ref(),
        &settings.component_id,
        &settings.endpoint,
    ));
}
