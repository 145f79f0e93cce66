//! Console and file logging shared by every binary of the workspace.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{BoxError, LOG_MAIN};

#[cfg(debug_assertions)]
const DEFAULT_DIRECTIVES: &str = "info,wgpu=error,naga=warn";
#[cfg(not(debug_assertions))]
const DEFAULT_DIRECTIVES: &str = "warn";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Installs the global subscriber: ANSI console output plus a plain text copy
/// in `log_file`. `RUST_LOG` overrides the default level.
///
/// The returned guard flushes the file writer on drop.
pub fn init(log_file: &Path) -> Result<WorkerGuard, BoxError> {
    let dir = log_file.parent().ok_or("log file has no parent directory")?;
    let name = log_file.file_name().ok_or("log file has no file name")?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(filter());
    let console_layer = fmt::layer().with_target(false).with_filter(filter());

    if tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .is_err()
    {
        tracing::warn!(target: LOG_MAIN, "A tracing subscriber is already installed");
    }
    Ok(guard)
}
