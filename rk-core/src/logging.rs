//! Structured logging setup using the `tracing` ecosystem.
//!
//! Console output always goes to stderr so stdout stays free for command
//! output. An optional daily-rotated file layer can emit plain text or JSON.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::constants::LOG_FILE_NAME;
use crate::error::{RkError, RkResult};

/// Build an `EnvFilter`, falling back to `info` for an unparsable directive.
fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn console_layer<S>() -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .compact()
}

/// Initialize the global tracing subscriber with console and file output.
///
/// # Arguments
/// * `level` - Filter directive, e.g. "info" or "rk_api=debug"
/// * `log_dir` - Directory for rotated log files, created if missing
/// * `json_output` - If true, the file layer writes JSON lines
///
/// Fails if the directory cannot be created or a global subscriber is
/// already installed.
pub fn init_logging(level: &str, log_dir: &Path, json_output: bool) -> RkResult<LogGuard> {
    std::fs::create_dir_all(log_dir)?;

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(log_dir, LOG_FILE_NAME));

    let file_layer = if json_output {
        fmt::layer()
            .with_writer(writer)
            .json()
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter(level))
        .with(console_layer())
        .with(file_layer)
        .try_init()
        .map_err(|e| RkError::Internal(format!("failed to install log subscriber: {e}")))?;

    tracing::info!("logging initialized at level={level}, dir={}", log_dir.display());

    Ok(LogGuard { _guard: guard })
}

/// Initialize logging from a [`LoggingConfig`], resolving the directory with
/// `log_dir` when the config leaves it empty.
pub fn init_from_config(config: &LoggingConfig, log_dir: &Path) -> RkResult<LogGuard> {
    let dir = if config.directory.is_empty() {
        log_dir
    } else {
        Path::new(&config.directory)
    };
    init_logging(&config.level, dir, config.json_output)
}

/// Guard that keeps the non-blocking log writer alive.
/// Drop this to flush and close the log file.
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// Initialize a console-only logger. Later calls are no-ops.
pub fn init_console_logging(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(filter(level))
        .with(console_layer())
        .try_init();
}
