//! Chat backend capabilities consumed by the console.
//!
//! The UI never talks to a protocol implementation directly; it goes through
//! [`ChatBackend`]. [`archive::ArchiveBackend`] is the bundled implementation.

pub mod archive;
pub mod cache;

use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub use archive::ArchiveBackend;
pub use cache::MessageCache;

pub const ALL_CHATS_TITLE: &str = "All Chats";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderInfo {
    /// `None` for the "All Chats" pseudo-folder.
    pub id: Option<i32>,
    pub title: String,
    pub count: usize,
}

impl FolderInfo {
    pub fn label(&self) -> String {
        format!("{} ({})", self.title, self.count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Peer {
    User {
        first_name: String,
        #[serde(default)]
        last_name: Option<String>,
    },
    Group {
        title: String,
    },
    Channel {
        title: String,
    },
}

impl Peer {
    pub fn display_name(&self) -> String {
        match self {
            Peer::User {
                first_name,
                last_name,
            } => match last_name.as_deref().filter(|l| !l.is_empty()) {
                Some(last) => format!("{first_name} {last}"),
                None => first_name.clone(),
            },
            Peer::Group { title } | Peer::Channel { title } => title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub chat_id: i64,
    pub peer: Peer,
    pub unread_count: u32,
    pub folder_id: Option<i32>,
    pub last_message_date: Option<DateTime<Utc>>,
}

impl Dialog {
    pub fn display_name(&self) -> String {
        self.peer.display_name()
    }
}

/// Reference to a downloadable attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    pub chat_id: i64,
    pub message_id: i32,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: i32,
    pub chat_id: i64,
    pub from_id: Option<i64>,
    pub date: DateTime<Utc>,
    pub text: String,
    pub media: Option<MediaRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    NewMessage(ChatMessage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginToken {
    pub phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInOutcome {
    Authorized,
    PasswordRequired,
}

#[derive(Debug)]
pub enum ClientError {
    NotFound(String),
    Auth(String),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Archive {
        path: PathBuf,
        source: serde_json::Error,
    },
    Media(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::NotFound(what) => write!(f, "{what} not found"),
            ClientError::Auth(reason) => write!(f, "{reason}"),
            ClientError::Io { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
            ClientError::Archive { path, source } => {
                write!(f, "Invalid archive {}: {}", path.display(), source)
            }
            ClientError::Media(reason) => write!(f, "{reason}"),
        }
    }
}

impl StdError for ClientError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ClientError::Io { source, .. } => Some(source),
            ClientError::Archive { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn is_authorized(&self) -> Result<bool, ClientError>;

    async fn request_login_code(&self, phone: &str) -> Result<LoginToken, ClientError>;

    async fn sign_in(&self, token: &LoginToken, code: &str) -> Result<SignInOutcome, ClientError>;

    async fn check_password(&self, password: &str) -> Result<(), ClientError>;

    /// The "All Chats" pseudo-folder followed by the account's folders.
    async fn fetch_folders(&self) -> Result<Vec<FolderInfo>, ClientError>;

    /// Dialogs in `folder_id` (all dialogs for `None`), most recent first.
    async fn fetch_dialogs(&self, folder_id: Option<i32>) -> Result<Vec<Dialog>, ClientError>;

    /// History newest first. A positive `offset_id` only returns older messages.
    async fn fetch_messages(
        &self,
        chat_id: i64,
        limit: usize,
        offset_id: i32,
    ) -> Result<Vec<ChatMessage>, ClientError>;

    async fn sender_name(&self, user_id: i64) -> Result<String, ClientError>;

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<ChatMessage, ClientError>;

    /// Raw bytes of the attachment, or `None` when there is nothing to download.
    async fn download_media(&self, media: &MediaRef) -> Result<Option<Vec<u8>>, ClientError>;

    fn subscribe(&self) -> broadcast::Receiver<Update>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_display_name_joins_last_name() {
        let peer = Peer::User {
            first_name: "Ada".into(),
            last_name: Some("Lovelace".into()),
        };
        assert_eq!(peer.display_name(), "Ada Lovelace");

        let peer = Peer::User {
            first_name: "Ada".into(),
            last_name: Some(String::new()),
        };
        assert_eq!(peer.display_name(), "Ada");
    }

    #[test]
    fn group_and_channel_use_title() {
        assert_eq!(
            Peer::Group {
                title: "Rustaceans".into()
            }
            .display_name(),
            "Rustaceans"
        );
        assert_eq!(
            Peer::Channel {
                title: "News".into()
            }
            .display_name(),
            "News"
        );
    }

    #[test]
    fn folder_label_includes_count() {
        let folder = FolderInfo {
            id: None,
            title: ALL_CHATS_TITLE.into(),
            count: 7,
        };
        assert_eq!(folder.label(), "All Chats (7)");
    }
}
