//! Greedy word wrapping for the chat transcript.
//!
//! The transcript needs to know exactly how many visual rows each message
//! occupies so scrolling can be computed before drawing. Lines are therefore
//! wrapped here and rendered with a `Paragraph` that does no wrapping itself.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

#[derive(Debug, Clone, Copy)]
pub struct WrapConfig {
    /// Maximum display width of a row.
    pub width: usize,
}

impl WrapConfig {
    pub fn new(width: usize) -> Self {
        Self { width: width.max(1) }
    }
}

pub struct TextWrapper;

impl TextWrapper {
    /// Wraps `text` into display rows. Explicit newlines always start a new
    /// row; words longer than the width are split by character.
    pub fn wrap_lines(text: &str, config: &WrapConfig) -> Vec<String> {
        let mut rows = Vec::new();
        for line in text.split('\n') {
            wrap_single_line(line, config.width, &mut rows);
        }
        rows
    }
}

fn wrap_single_line(line: &str, width: usize, rows: &mut Vec<String>) {
    if line.width() <= width {
        rows.push(line.to_string());
        return;
    }

    let mut current = String::new();
    let mut current_width = 0;

    for word in line.split(' ') {
        let word_width = word.width();
        let separator = usize::from(!current.is_empty());

        if current_width + separator + word_width <= width {
            if separator == 1 {
                current.push(' ');
            }
            current.push_str(word);
            current_width += separator + word_width;
            continue;
        }

        if !current.is_empty() {
            rows.push(std::mem::take(&mut current));
            current_width = 0;
        }

        if word_width <= width {
            current.push_str(word);
            current_width = word_width;
            continue;
        }

        for ch in word.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if current_width + ch_width > width && !current.is_empty() {
                rows.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push(ch);
            current_width += ch_width;
        }
    }

    rows.push(current);
}
