//! Media handling for message attachments.

pub mod ascii;

pub use ascii::{render, render_media_text, render_or_placeholder, RenderError, GLYPH_RAMP};
