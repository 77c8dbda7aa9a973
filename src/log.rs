//! Structured logging for taskagent.
//!
//! Log levels:
//! - ERROR: data-service failures surfaced to the caller
//! - WARN: recoverable oddities (dangling dependencies, unknown domain names)
//! - INFO: tool invocations and their outcomes
//! - DEBUG: classifier scores, template expansion, resolver decisions
//! - TRACE: per-keyword and per-task detail
//!
//! Stdout carries tool output, so logs go to `~/.taskagent/taskagent.log`.
//! Debug mode can be enabled with `--debug` or `TASKAGENT_DEBUG=1`; `RUST_LOG`
//! overrides both.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::Result;

/// Environment variable that switches on debug logging.
pub const DEBUG_ENV: &str = "TASKAGENT_DEBUG";

/// Initialize logging with explicit debug mode setting.
///
/// Truncates the log file on startup and returns its path.
pub fn init_with_debug(debug: bool) -> Result<PathBuf> {
    let debug_mode = debug_enabled(debug, std::env::var(DEBUG_ENV).ok().as_deref());
    let path = log_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(&path)?;

    // A subscriber may already be installed (tests, embedding hosts).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(debug_mode))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init();

    tracing::debug!(path = %path.display(), debug_mode, "logging initialized");
    Ok(path)
}

/// Location of the log file.
pub fn log_path() -> Result<PathBuf> {
    Ok(Config::app_dir()?.join("taskagent.log"))
}

fn filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(debug)))
}

fn default_directive(debug: bool) -> &'static str {
    if debug {
        "taskagent=debug"
    } else {
        "taskagent=info"
    }
}

/// The `--debug` flag or a truthy `TASKAGENT_DEBUG` turns debug on.
fn debug_enabled(flag: bool, env: Option<&str>) -> bool {
    flag || env_flag(env)
}

fn env_flag(value: Option<&str>) -> bool {
    value
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
