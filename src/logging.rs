//! Tracing subscriber installation

use std::path::Path;

use tracing::warn;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives
pub const LOG_FILTER_ENV: &str = "BUNDLE_UPDATER_LOG";

const DEFAULT_FILTER: &str = "bundle_updater=info";

/// Where log records are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
}

fn env_filter() -> EnvFilter {
    filter_from(std::env::var(LOG_FILTER_ENV).ok().as_deref())
}

/// Unset or unparsable directives fall back to the default filter
fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

fn file_writer(path: &Path) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("log path {} has no file name", path.display()))?;
    std::fs::create_dir_all(dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)?;
    Ok(tracing_appender::non_blocking(appender))
}

/// Install the global subscriber.
///
/// A log file that cannot be opened falls back to stderr with a warning.
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes pending records.
pub fn init(target: LogTarget<'_>, json: bool) -> anyhow::Result<WorkerGuard> {
    let mut unopened = None;
    let (writer, guard, ansi) = match target {
        LogTarget::File(path) => match file_writer(path) {
            Ok((writer, guard)) => (writer, guard, false),
            Err(e) => {
                unopened = Some((path, e));
                let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
                (writer, guard, true)
            }
        },
        LogTarget::Stderr => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
            (writer, guard, true)
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(ansi);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))?;

    if let Some((path, e)) = unopened {
        warn!(
            "Cannot write log file {}, logging to stderr: {}",
            path.display(),
            e
        );
    }

    Ok(guard)
}
