//! `set`/`unset` support for config keys.

use std::fmt;
use std::path::PathBuf;

use crate::core::config::data::Config;
use crate::core::constants::{
    DEFAULT_ASCII_ART_WIDTH, DEFAULT_MAX_MESSAGES, DEFAULT_SESSION_FILE, MAX_ASCII_ART_WIDTH,
};

pub const SETTING_KEYS: [&str; 4] = ["archive", "session-file", "ascii-art-width", "max-messages"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingError {
    UnknownKey(String),
    InvalidNumber { key: &'static str, input: String },
    TooLarge { key: &'static str, max: u64 },
    MissingValue(&'static str),
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => write!(
                f,
                "Unknown config key: {key} (expected one of: {})",
                SETTING_KEYS.join(", ")
            ),
            SettingError::InvalidNumber { key, input } => {
                write!(f, "{key} must be a positive integer, got '{input}'")
            }
            SettingError::TooLarge { key, max } => write!(f, "{key} must be at most {max}"),
            SettingError::MissingValue(key) => write!(f, "A value is required for {key}"),
        }
    }
}

impl std::error::Error for SettingError {}

fn parse_positive(key: &'static str, input: &str) -> Result<u64, SettingError> {
    match input.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(SettingError::InvalidNumber {
            key,
            input: input.to_string(),
        }),
    }
}

impl Config {
    /// Apply `value` to `key`, returning the stored value's display form.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<String, SettingError> {
        match key {
            "archive" => {
                if value.trim().is_empty() {
                    return Err(SettingError::MissingValue("archive"));
                }
                self.archive = Some(PathBuf::from(value.trim()));
                Ok(value.trim().to_string())
            }
            "session-file" => {
                if value.trim().is_empty() {
                    return Err(SettingError::MissingValue("session-file"));
                }
                self.session_file = value.trim().to_string();
                Ok(self.session_file.clone())
            }
            "ascii-art-width" => {
                let width = parse_positive("ascii-art-width", value)?;
                if width > u64::from(MAX_ASCII_ART_WIDTH) {
                    return Err(SettingError::TooLarge {
                        key: "ascii-art-width",
                        max: u64::from(MAX_ASCII_ART_WIDTH),
                    });
                }
                self.ascii_art_width = width as u32;
                Ok(self.ascii_art_width.to_string())
            }
            "max-messages" => {
                let count = parse_positive("max-messages", value)?;
                self.max_messages = count as usize;
                Ok(self.max_messages.to_string())
            }
            other => Err(SettingError::UnknownKey(other.to_string())),
        }
    }

    /// Restore `key` to its default.
    pub fn unset_value(&mut self, key: &str) -> Result<(), SettingError> {
        match key {
            "archive" => self.archive = None,
            "session-file" => self.session_file = DEFAULT_SESSION_FILE.to_string(),
            "ascii-art-width" => self.ascii_art_width = DEFAULT_ASCII_ART_WIDTH,
            "max-messages" => self.max_messages = DEFAULT_MAX_MESSAGES,
            other => return Err(SettingError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}
