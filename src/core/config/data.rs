use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use crate::core::constants::{
    DEFAULT_ASCII_ART_WIDTH, DEFAULT_MAX_MESSAGES, DEFAULT_SESSION_FILE, MAX_ASCII_ART_WIDTH,
};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    /// Chat archive served by the bundled backend
    pub archive: Option<PathBuf>,
    /// Session file name; relative paths resolve inside the config directory
    #[serde(default = "default_session_file")]
    pub session_file: String,
    /// Width in characters of rendered image media
    #[serde(default = "default_ascii_art_width")]
    pub ascii_art_width: u32,
    /// Messages fetched per history page
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
}

fn default_session_file() -> String {
    DEFAULT_SESSION_FILE.to_string()
}

fn default_ascii_art_width() -> u32 {
    DEFAULT_ASCII_ART_WIDTH
}

fn default_max_messages() -> usize {
    DEFAULT_MAX_MESSAGES
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archive: None,
            session_file: default_session_file(),
            ascii_art_width: default_ascii_art_width(),
            max_messages: default_max_messages(),
        }
    }
}

impl Config {
    /// Configured render width, falling back to the default when zero.
    pub fn ascii_width(&self) -> NonZeroU32 {
        NonZeroU32::new(self.ascii_art_width.min(MAX_ASCII_ART_WIDTH))
            .or_else(|| NonZeroU32::new(DEFAULT_ASCII_ART_WIDTH))
            .unwrap_or(NonZeroU32::MIN)
    }

    pub fn page_size(&self) -> usize {
        self.max_messages.max(1)
    }

    /// Resolve the session file against `config_dir` unless it is absolute.
    pub fn session_path_in(&self, config_dir: &Path) -> PathBuf {
        let session = Path::new(&self.session_file);
        if session.is_absolute() {
            session.to_path_buf()
        } else {
            config_dir.join(session)
        }
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
