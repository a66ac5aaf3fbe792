use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter directives are read from this variable before `RUST_LOG`.
pub const LOG_ENV: &str = "EXPRSCOPE_LOG";

const DEFAULT_FILTER: &str = "info,exprscope_core=debug";

fn log_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".exprscope")
        .join("logs")
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber: a daily file per component
/// (`shell.log.2024-01-21`) and optionally stderr.
///
/// Returns `None` when a subscriber is already installed. The guard must be
/// kept alive for buffered lines to reach the file.
pub fn init_logging(component: &str, to_stderr: bool) -> Option<WorkerGuard> {
    let dir = log_dir();
    let _ = std::fs::create_dir_all(&dir);
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&dir, component));

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);
    let stderr_layer = to_stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(filter())
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .ok()
        .map(|()| guard)
}
