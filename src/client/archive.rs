//! A [`ChatBackend`] served from a JSON chat archive on disk.
//!
//! The archive holds the account's folders, users and chats with their
//! messages. Media payloads are either inline base64 or files relative to the
//! archive's directory. Sent messages are appended and written back.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::client::{
    ChatBackend, ChatMessage, ClientError, Dialog, FolderInfo, LoginToken, MediaRef, Peer,
    SignInOutcome, Update, ALL_CHATS_TITLE,
};
use crate::core::constants::DIALOG_FETCH_LIMIT;
use crate::utils::fs::write_atomic;

const UPDATE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub me: Option<ArchivedUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<ArchivedAccount>,
    #[serde(default)]
    pub folders: Vec<ArchivedFolder>,
    #[serde(default)]
    pub users: Vec<ArchivedUser>,
    #[serde(default)]
    pub chats: Vec<ArchivedChat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedAccount {
    pub phone: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedFolder {
    pub id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedUser {
    pub id: i64,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedChat {
    pub id: i64,
    #[serde(flatten)]
    pub peer: Peer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<i32>,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default)]
    pub messages: Vec<ArchivedMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedMessage {
    pub id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_id: Option<i64>,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<ArchivedMedia>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedMedia {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Path relative to the archive's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Inline base64 payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    phone: String,
}

impl ArchivedChat {
    fn last_message_date(&self) -> Option<DateTime<Utc>> {
        self.messages.iter().map(|m| m.date).max()
    }

    fn to_dialog(&self) -> Dialog {
        Dialog {
            chat_id: self.id,
            peer: self.peer.clone(),
            unread_count: self.unread_count,
            folder_id: self.folder_id,
            last_message_date: self.last_message_date(),
        }
    }
}

impl ArchivedMessage {
    fn to_message(&self, chat_id: i64) -> ChatMessage {
        ChatMessage {
            id: self.id,
            chat_id,
            from_id: self.from_id,
            date: self.date,
            text: self.text.clone(),
            media: self.media.as_ref().map(|media| MediaRef {
                chat_id,
                message_id: self.id,
                mime_type: media.mime_type.clone(),
            }),
        }
    }
}

impl ArchivedUser {
    fn display_name(&self) -> String {
        Peer::User {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
        .display_name()
    }
}

pub struct ArchiveBackend {
    archive_path: PathBuf,
    base_dir: PathBuf,
    session_path: PathBuf,
    persist: bool,
    state: RwLock<ArchiveFile>,
    /// Serializes sends so ids are assigned against the committed archive.
    send_lock: tokio::sync::Mutex<()>,
    pending_password: Mutex<Option<String>>,
    updates: broadcast::Sender<Update>,
}

/// Runs blocking file I/O off the async worker threads.
async fn run_blocking<T, F>(path: PathBuf, op: F) -> Result<T, ClientError>
where
    T: Send + 'static,
    F: FnOnce(&Path) -> io::Result<T> + Send + 'static,
{
    let task_path = path.clone();
    let result = tokio::task::spawn_blocking(move || op(&task_path))
        .await
        .unwrap_or_else(|err| Err(io::Error::other(err)));
    result.map_err(|source| ClientError::Io { path, source })
}

fn normalize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

impl ArchiveBackend {
    pub fn open(archive_path: &Path, session_path: &Path) -> Result<Self, ClientError> {
        let contents = fs::read_to_string(archive_path).map_err(|source| ClientError::Io {
            path: archive_path.to_path_buf(),
            source,
        })?;
        let archive: ArchiveFile =
            serde_json::from_str(&contents).map_err(|source| ClientError::Archive {
                path: archive_path.to_path_buf(),
                source,
            })?;
        info!(
            path = %archive_path.display(),
            chats = archive.chats.len(),
            "opened chat archive"
        );
        Ok(Self::from_archive(archive, archive_path, session_path))
    }

    pub fn from_archive(archive: ArchiveFile, archive_path: &Path, session_path: &Path) -> Self {
        let base_dir = archive_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            archive_path: archive_path.to_path_buf(),
            base_dir,
            session_path: session_path.to_path_buf(),
            persist: true,
            state: RwLock::new(archive),
            send_lock: tokio::sync::Mutex::new(()),
            pending_password: Mutex::new(None),
            updates,
        }
    }

    /// Keeps sent messages in memory only.
    pub fn without_persistence(mut self) -> Self {
        self.persist = false;
        self
    }

    fn read<T>(&self, f: impl FnOnce(&ArchiveFile) -> T) -> T {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn account(&self) -> Option<ArchivedAccount> {
        self.read(|archive| archive.account.clone())
    }

    fn set_pending_password(&self, phone: Option<String>) {
        *self
            .pending_password
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = phone;
    }

    async fn save_archive(&self, archive: &ArchiveFile) -> Result<(), ClientError> {
        if !self.persist {
            return Ok(());
        }
        let json = serde_json::to_vec_pretty(archive).map_err(|source| ClientError::Archive {
            path: self.archive_path.clone(),
            source,
        })?;
        run_blocking(self.archive_path.clone(), move |path| write_atomic(path, &json)).await
    }

    async fn write_session(&self, phone: &str) -> Result<(), ClientError> {
        let record = SessionRecord {
            phone: phone.to_string(),
        };
        let json = serde_json::to_vec(&record).map_err(|source| ClientError::Archive {
            path: self.session_path.clone(),
            source,
        })?;
        run_blocking(self.session_path.clone(), move |path| write_atomic(path, &json)).await?;
        info!(path = %self.session_path.display(), "session saved");
        Ok(())
    }

    fn read_session(&self) -> Option<SessionRecord> {
        let contents = fs::read_to_string(&self.session_path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(path = %self.session_path.display(), error = %err, "ignoring unreadable session file");
                None
            }
        }
    }
}

#[async_trait]
impl ChatBackend for ArchiveBackend {
    async fn is_authorized(&self) -> Result<bool, ClientError> {
        let Some(account) = self.account() else {
            return Ok(true);
        };
        Ok(self
            .read_session()
            .is_some_and(|session| normalize_phone(&session.phone) == normalize_phone(&account.phone)))
    }

    async fn request_login_code(&self, phone: &str) -> Result<LoginToken, ClientError> {
        let phone = normalize_phone(phone);
        if let Some(account) = self.account() {
            if normalize_phone(&account.phone) != phone {
                return Err(ClientError::Auth(format!(
                    "No account registered for {phone}"
                )));
            }
        }
        debug!(%phone, "login code requested");
        Ok(LoginToken { phone })
    }

    async fn sign_in(&self, token: &LoginToken, code: &str) -> Result<SignInOutcome, ClientError> {
        let Some(account) = self.account() else {
            return Ok(SignInOutcome::Authorized);
        };
        if normalize_phone(&account.phone) != token.phone {
            return Err(ClientError::Auth("Login token does not match account".into()));
        }
        if code.trim() != account.code {
            return Err(ClientError::Auth("Invalid verification code".into()));
        }
        if account.password.is_some() {
            self.set_pending_password(Some(token.phone.clone()));
            return Ok(SignInOutcome::PasswordRequired);
        }
        self.write_session(&token.phone).await?;
        Ok(SignInOutcome::Authorized)
    }

    async fn check_password(&self, password: &str) -> Result<(), ClientError> {
        let phone = self
            .pending_password
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| ClientError::Auth("No sign-in in progress".into()))?;
        let expected = self.account().and_then(|account| account.password);
        if expected.as_deref() != Some(password) {
            return Err(ClientError::Auth("Invalid two-factor password".into()));
        }
        self.write_session(&phone).await?;
        self.set_pending_password(None);
        Ok(())
    }

    async fn fetch_folders(&self) -> Result<Vec<FolderInfo>, ClientError> {
        let total = self.fetch_dialogs(None).await?.len();
        Ok(self.read(|archive| {
            let mut folders = vec![FolderInfo {
                id: None,
                title: ALL_CHATS_TITLE.to_string(),
                count: total,
            }];
            folders.extend(archive.folders.iter().map(|folder| FolderInfo {
                id: Some(folder.id),
                title: folder
                    .title
                    .clone()
                    .unwrap_or_else(|| format!("Folder {}", folder.id)),
                count: archive
                    .chats
                    .iter()
                    .filter(|chat| chat.folder_id == Some(folder.id))
                    .count(),
            }));
            folders
        }))
    }

    async fn fetch_dialogs(&self, folder_id: Option<i32>) -> Result<Vec<Dialog>, ClientError> {
        Ok(self.read(|archive| {
            let mut dialogs: Vec<Dialog> = archive
                .chats
                .iter()
                .filter(|chat| folder_id.is_none() || chat.folder_id == folder_id)
                .map(ArchivedChat::to_dialog)
                .collect();
            dialogs.sort_by(|a, b| {
                b.last_message_date
                    .cmp(&a.last_message_date)
                    .then(a.chat_id.cmp(&b.chat_id))
            });
            dialogs.truncate(DIALOG_FETCH_LIMIT);
            dialogs
        }))
    }

    async fn fetch_messages(
        &self,
        chat_id: i64,
        limit: usize,
        offset_id: i32,
    ) -> Result<Vec<ChatMessage>, ClientError> {
        self.read(|archive| {
            let chat = archive
                .chats
                .iter()
                .find(|chat| chat.id == chat_id)
                .ok_or_else(|| ClientError::NotFound(format!("Chat {chat_id}")))?;
            let mut messages: Vec<ChatMessage> = chat
                .messages
                .iter()
                .filter(|m| offset_id <= 0 || m.id < offset_id)
                .map(|m| m.to_message(chat_id))
                .collect();
            messages.sort_by(|a, b| b.id.cmp(&a.id));
            messages.truncate(limit);
            Ok(messages)
        })
    }

    async fn sender_name(&self, user_id: i64) -> Result<String, ClientError> {
        self.read(|archive| {
            archive
                .me
                .iter()
                .chain(archive.users.iter())
                .find(|user| user.id == user_id)
                .map(ArchivedUser::display_name)
                .or_else(|| {
                    archive
                        .chats
                        .iter()
                        .find(|chat| chat.id == user_id && matches!(chat.peer, Peer::User { .. }))
                        .map(|chat| chat.peer.display_name())
                })
                .ok_or_else(|| ClientError::NotFound(format!("User {user_id}")))
        })
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<ChatMessage, ClientError> {
        let _send = self.send_lock.lock().await;
        let (candidate, message) = self.read(|archive| {
            let mut candidate = archive.clone();
            let from_id = candidate.me.as_ref().map(|me| me.id);
            let chat = candidate
                .chats
                .iter_mut()
                .find(|chat| chat.id == chat_id)
                .ok_or_else(|| ClientError::NotFound(format!("Chat {chat_id}")))?;
            let id = chat.messages.iter().map(|m| m.id).max().unwrap_or(0) + 1;
            let archived = ArchivedMessage {
                id,
                from_id,
                date: Utc::now(),
                text: text.to_string(),
                media: None,
            };
            let message = archived.to_message(chat_id);
            chat.messages.push(archived);
            Ok::<_, ClientError>((candidate, message))
        })?;

        // Only a persisted archive becomes visible.
        self.save_archive(&candidate).await?;
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = candidate;

        debug!(chat_id, message_id = message.id, "message sent");
        // No receivers is fine; nobody is listening yet.
        let _ = self.updates.send(Update::NewMessage(message.clone()));
        Ok(message)
    }

    async fn download_media(&self, media: &MediaRef) -> Result<Option<Vec<u8>>, ClientError> {
        let payload = self.read(|archive| {
            archive
                .chats
                .iter()
                .find(|chat| chat.id == media.chat_id)
                .and_then(|chat| chat.messages.iter().find(|m| m.id == media.message_id))
                .map(|m| m.media.clone())
        });
        let Some(payload) = payload else {
            return Err(ClientError::NotFound(format!(
                "Message {} in chat {}",
                media.message_id, media.chat_id
            )));
        };
        let Some(payload) = payload else {
            return Ok(None);
        };

        if let Some(data) = payload.data {
            let bytes = BASE64
                .decode(data.trim())
                .map_err(|err| ClientError::Media(format!("invalid inline media: {err}")))?;
            return Ok(Some(bytes));
        }

        if let Some(file) = payload.file {
            let bytes = run_blocking(self.base_dir.join(file), |path| fs::read(path)).await?;
            return Ok(Some(bytes));
        }

        Ok(None)
    }

    fn subscribe(&self) -> broadcast::Receiver<Update> {
        self.updates.subscribe()
    }
}
