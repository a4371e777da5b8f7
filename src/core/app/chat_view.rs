use tui_textarea::TextArea;

use crate::client::Dialog;
use crate::core::history::RenderedMessage;

/// Scroll position measured in rows up from the bottom of the transcript.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranscriptScroll {
    pub from_bottom: u16,
}

impl TranscriptScroll {
    pub fn follows_latest(&self) -> bool {
        self.from_bottom == 0
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.from_bottom = self.from_bottom.saturating_add(rows);
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.from_bottom = self.from_bottom.saturating_sub(rows);
    }

    pub fn reset(&mut self) {
        self.from_bottom = 0;
    }

    /// First visible row for a transcript of `total` rows in a `viewport`.
    pub fn top_row(&self, total: usize, viewport: usize) -> usize {
        let max_top = total.saturating_sub(viewport);
        max_top.saturating_sub(usize::from(self.from_bottom))
    }

    pub fn clamp(&mut self, total: usize, viewport: usize) {
        let max = total.saturating_sub(viewport);
        let max = u16::try_from(max).unwrap_or(u16::MAX);
        self.from_bottom = self.from_bottom.min(max);
    }
}

/// An open conversation.
pub struct ChatView {
    pub dialog: Dialog,
    pub title: String,
    /// Oldest first, the order they are drawn in.
    pub messages: Vec<RenderedMessage>,
    pub loading: bool,
    pub sending: bool,
    /// A live message arrived while a load or send was in flight.
    pub reload_pending: bool,
    pub error: Option<String>,
    pub input: TextArea<'static>,
    pub scroll: TranscriptScroll,
}

impl ChatView {
    pub fn new(dialog: Dialog) -> Self {
        let title = dialog.display_name();
        let mut input = TextArea::default();
        input.set_placeholder_text("Type a message, Enter to send");
        Self {
            dialog,
            title,
            messages: Vec::new(),
            loading: true,
            sending: false,
            reload_pending: false,
            error: None,
            input,
            scroll: TranscriptScroll::default(),
        }
    }

    pub fn chat_id(&self) -> i64 {
        self.dialog.chat_id
    }

    pub fn oldest_id(&self) -> Option<i32> {
        self.messages.first().map(|m| m.id)
    }

    /// Replaces the transcript with a fresh page delivered newest first.
    pub fn replace_history(&mut self, mut page: Vec<RenderedMessage>) {
        page.reverse();
        self.messages = page;
        self.scroll.reset();
    }

    /// Adds an older page above the current transcript.
    pub fn prepend_history(&mut self, mut page: Vec<RenderedMessage>) {
        page.retain(|m| !self.messages.iter().any(|existing| existing.id == m.id));
        page.reverse();
        page.append(&mut self.messages);
        self.messages = page;
    }

    pub fn input_text(&self) -> String {
        self.input.lines().join("\n")
    }

    pub fn clear_input(&mut self) {
        self.input = TextArea::default();
        self.input
            .set_placeholder_text("Type a message, Enter to send");
    }
}
