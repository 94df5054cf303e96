//! Tracing setup.
//!
//! Logs go to `$ROSTER_HOME/logs/roster.log`; stdout and stderr stay with
//! the terminal UI and command output.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LogConfig;

pub const LOG_FILE: &str = "roster.log";

static INIT: OnceLock<PathBuf> = OnceLock::new();

/// Picks `RUST_LOG` when set, else the configured directive.
pub fn filter_directive(config: &LogConfig, rust_log: Option<String>) -> String {
    rust_log
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.filter.clone())
}

/// Installs the global subscriber, appending to `<log_dir>/roster.log`.
/// Later calls return the first log path.
///
/// # Errors
/// Returns an error if the log file cannot be opened, the filter does not
/// parse, or another subscriber is already installed.
pub fn init(config: &LogConfig, log_dir: &Path) -> Result<PathBuf> {
    if let Some(path) = INIT.get() {
        return Ok(path.clone());
    }

    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let path = log_dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let directive = filter_directive(config, std::env::var("RUST_LOG").ok());
    let env_filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("Invalid log filter '{directive}'"))?;

    let fmt_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    INIT.set(path.clone())
        .map_err(|_already| anyhow!("tracing already initialized"))?;
    tracing::debug!(path = %path.display(), "Logging initialized");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_log_wins_over_config() {
        let config = LogConfig {
            filter: "warn".into(),
        };
        assert_eq!(filter_directive(&config, None), "warn");
        assert_eq!(
            filter_directive(&config, Some("roster_core=debug".into())),
            "roster_core=debug"
        );
        assert_eq!(filter_directive(&config, Some("  ".into())), "warn");
    }

    #[test]
    fn test_init_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let path = init(&LogConfig::default(), &log_dir).unwrap();
        assert!(path.exists());
        // Second call is a no-op.
        assert_eq!(init(&LogConfig::default(), &log_dir).unwrap(), path);
    }
}
