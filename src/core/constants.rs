//! Shared constants used across the application

/// Character width of ASCII renderings when the config does not set one.
pub const DEFAULT_ASCII_ART_WIDTH: u32 = 40;

/// Widest rendering accepted from the config or the command line.
pub const MAX_ASCII_ART_WIDTH: u32 = 1000;

/// Messages requested per history page.
pub const DEFAULT_MAX_MESSAGES: usize = 50;

pub const DEFAULT_SESSION_FILE: &str = "session.json";

/// Upper bound on dialogs returned by a single listing.
pub const DIALOG_FETCH_LIMIT: usize = 100;

/// Live messages kept per chat.
pub const MESSAGE_CACHE_LIMIT: usize = 100;

/// Ceiling on how long a single attachment may take to decode and render.
pub const MEDIA_RENDER_TIMEOUT_SECS: u64 = 10;

/// Rows moved by PageUp/PageDown in the chat view.
pub const PAGE_SCROLL_LINES: u16 = 10;

/// How long a status message stays in the footer.
pub const STATUS_DISPLAY_SECS: u64 = 4;
