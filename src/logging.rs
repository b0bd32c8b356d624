//! Process-wide `tracing` setup.
//!
//! The terminal is in raw mode while the session runs, so diagnostics are
//! best sent to a file (`--log-file`). Without one they go to stderr, where
//! the default `warn` level keeps them rare.

use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_FILTER_ENV: &str = "LCHAT_LOG";

/// Directive used when `LCHAT_LOG` is unset or empty.
pub const DEFAULT_FILTER: &str = "warn";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogConfig {
    /// Append logs here instead of stderr.
    pub file: Option<PathBuf>,
    /// Explicit filter directive; `None` reads `LCHAT_LOG`.
    pub filter: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("failed to open log file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid log filter {directive:?}: {reason}")]
    Filter { directive: String, reason: String },
    #[error("failed to configure logger: {0}")]
    Configure(String),
}

/// Install the global subscriber.
///
/// The returned guard owns the background writer; buffered events are
/// flushed when it is dropped, so keep it alive until the process is about
/// to exit.
///
/// # Errors
///
/// Fails if the log file cannot be opened, the filter does not parse, or
/// another global subscriber is already installed.
pub fn init(config: &LogConfig) -> Result<WorkerGuard, InitError> {
    let (subscriber, guard) = build_subscriber(config)?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| InitError::Configure(err.to_string()))?;
    tracing::debug!("logging initialised");
    Ok(guard)
}

/// Subscriber and writer guard for `config`, without installing anything.
fn build_subscriber(
    config: &LogConfig,
) -> Result<(impl tracing::Subscriber + Send + Sync + 'static, WorkerGuard), InitError> {
    let directive = filter_directive(
        config
            .filter
            .clone()
            .or_else(|| std::env::var(LOG_FILTER_ENV).ok()),
    );
    let env_filter =
        EnvFilter::try_new(&directive).map_err(|err| InitError::Filter {
            directive: directive.clone(),
            reason: err.to_string(),
        })?;

    let (writer, guard) = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| InitError::Io {
                    path: path.clone(),
                    source,
                })?;
            tracing_appender::non_blocking(file)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_level(true)
        .with_target(true)
        .with_thread_names(true)
        .with_ansi(config.file.is_none())
        .with_writer(writer)
        .finish();
    Ok((subscriber, guard))
}

/// The directive to use, falling back to [`DEFAULT_FILTER`] when unset.
pub fn filter_directive(requested: Option<String>) -> String {
    requested
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}
