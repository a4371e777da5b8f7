//! Turning backend messages into display-ready entries.

use std::num::NonZeroU32;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use futures_util::future::join_all;
use tracing::debug;

use crate::client::{ChatBackend, ChatMessage};
use crate::media::render_media_text;

pub const UNKNOWN_SENDER: &str = "Unknown";
pub const MEDIA_NOT_DOWNLOADED: &str = "[Media: Could not download]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub id: i32,
    pub sender: String,
    pub date: DateTime<Utc>,
    pub text: String,
    /// ASCII rendering or placeholder for the attachment.
    pub media: Option<String>,
}

impl RenderedMessage {
    pub fn timestamp(&self) -> String {
        self.date
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    pub ascii_width: NonZeroU32,
    pub media_timeout: Duration,
}

async fn resolve_sender(backend: &dyn ChatBackend, from_id: Option<i64>) -> String {
    let Some(user_id) = from_id else {
        return UNKNOWN_SENDER.to_string();
    };
    match backend.sender_name(user_id).await {
        Ok(name) if !name.is_empty() => name,
        Ok(_) => UNKNOWN_SENDER.to_string(),
        Err(err) => {
            debug!(user_id, error = %err, "could not resolve sender");
            UNKNOWN_SENDER.to_string()
        }
    }
}

pub async fn render_message(
    backend: &dyn ChatBackend,
    message: ChatMessage,
    settings: RenderSettings,
) -> RenderedMessage {
    let sender = resolve_sender(backend, message.from_id).await;

    let media = match &message.media {
        None => None,
        Some(media) => Some(match backend.download_media(media).await {
            Ok(Some(bytes)) => {
                render_media_text(bytes, settings.ascii_width, settings.media_timeout).await
            }
            Ok(None) => MEDIA_NOT_DOWNLOADED.to_string(),
            Err(err) => format!("[Media: {err}]"),
        }),
    };

    RenderedMessage {
        id: message.id,
        sender,
        date: message.date,
        text: message.text,
        media,
    }
}

/// Renders a page of messages concurrently, preserving order.
pub async fn render_messages(
    backend: &dyn ChatBackend,
    messages: Vec<ChatMessage>,
    settings: RenderSettings,
) -> Vec<RenderedMessage> {
    join_all(
        messages
            .into_iter()
            .map(|message| render_message(backend, message, settings)),
    )
    .await
}
