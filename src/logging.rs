//! Diagnostic logging to a file.
//!
//! The console owns the terminal, so log output never goes to stdout or
//! stderr. Without `--log` no subscriber is installed and `tracing` macros
//! are no-ops.

use std::error::Error;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_FILTER_ENV: &str = "TGCONSOLE_LOG";
const DEFAULT_FILTER: &str = "info";

pub fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Appends structured logs to `path`, creating parent directories.
pub fn init_tracing(path: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter_from_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| format!("Failed to initialize logging: {err}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_log_file_and_directories() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("logs").join("console.log");
        // A global subscriber may already be set by another test; the file is
        // created before installation either way.
        let _ = init_tracing(&path);
        assert!(path.exists());
    }
}
