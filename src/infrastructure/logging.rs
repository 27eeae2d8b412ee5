//! Logging initialization.
//!
//! Stdout is reserved for protocol frames, so log output goes to a rolling
//! daily file (JSON, for structured search) and to stderr (compact, for a
//! human watching the process).

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use super::config::LoggingConfig;

/// Handle keeping the non-blocking file writer alive.
///
/// Dropping it flushes and stops the background writer; hold it for the
/// lifetime of the process.
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// Initialize the global subscriber from config.
pub fn init(config: &LoggingConfig) -> Result<LogGuard> {
    let level = parse_log_level(&config.level)?;

    std::fs::create_dir_all(&config.dir)
        .with_context(|| format!("Failed to create log directory {}", config.dir))?;

    let file_appender = rolling::daily(&config.dir, "shopbridge.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let file_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let stderr_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(true)
        .with_filter(file_filter);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_filter(stderr_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::info!(level = %config.level, dir = %config.dir, "logger initialized");

    Ok(LogGuard { _guard: guard })
}

/// Parse a log level string to a [`Level`].
fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {level}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert!(matches!(parse_log_level("trace"), Ok(Level::TRACE)));
        assert!(matches!(parse_log_level("INFO"), Ok(Level::INFO)));
        assert!(matches!(parse_log_level("error"), Ok(Level::ERROR)));
        assert!(parse_log_level("loud").is_err());
    }

    // init() installs a global subscriber, which can only happen once per
    // process; it is exercised by running the binary, not by unit tests.
}
