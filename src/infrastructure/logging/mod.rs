// Logging module - Logging infrastructure
use crate::domain::error::{TermError, TermResult};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_NAME: &str = "serialterm.log";

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(level: &str, verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { level };
    EnvFilter::new(format!("serialterm={},warn", level))
}

/// Initialize logging to stderr for command line use
pub fn init_logging(level: &str, verbose: bool) -> TermResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(level, verbose));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .try_init()
        .map_err(|e| TermError::Config {
            message: format!("Failed to initialize logging: {}", e),
        })?;

    tracing::debug!("SerialTerm logging system initialized");
    Ok(())
}

/// Default log file for the interactive terminal
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE_NAME)
}

/// Initialize logging to a file so the terminal UI is not overwritten
pub fn init_file_logging(path: &Path, level: &str, verbose: bool) -> TermResult<()> {
    let file: File = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(level, verbose));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .try_init()
        .map_err(|e| TermError::Config {
            message: format!("Failed to initialize logging: {}", e),
        })?;

    tracing::info!("SerialTerm logging to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_init() {
        // A second global subscriber is refused rather than panicking
        let _ = init_logging("info", false);
        assert!(init_logging("info", true).is_err());
    }

    #[test]
    fn test_default_filter_verbose() {
        assert!(default_filter("info", true).to_string().contains("serialterm=debug"));
        assert!(default_filter("trace", false).to_string().contains("serialterm=trace"));
    }

    #[test]
    fn test_default_log_path() {
        assert!(default_log_path().ends_with(LOG_FILE_NAME));
    }
}
