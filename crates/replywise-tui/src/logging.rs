use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "info,replywise_core=debug,replywise=debug";

/// Where log files go: `<data dir>/replywise/logs`
pub fn log_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("replywise").join("logs"))
}

/// Initialize tracing with a daily-rolling file layer.
///
/// The terminal is drawn by the UI, so nothing is written to stdout or
/// stderr. Default level: INFO, override via RUST_LOG. The returned guard
/// must live until exit or buffered lines are lost.
pub fn init(dir: &Path) -> Option<WorkerGuard> {
    std::fs::create_dir_all(dir).ok()?;

    let appender = tracing_appender::rolling::daily(dir, "replywise.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .ok()?;

    tracing::debug!(dir = %dir.display(), "Tracing initialized");
    Some(guard)
}
