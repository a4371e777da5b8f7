use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::client::{Dialog, FolderInfo, MessageCache};
use crate::core::config::Config;
use crate::core::constants::MEDIA_RENDER_TIMEOUT_SECS;
use crate::core::history::RenderSettings;
use crate::ui::theme::Theme;

pub mod actions;
pub mod chat_view;

pub use actions::{
    apply_action, apply_actions, AppAction, AppActionDispatcher, AppCommand,
};
pub use chat_view::{ChatView, TranscriptScroll};

/// Which list on the main screen receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Dialogs,
    Folders,
}

impl Panel {
    pub fn toggled(self) -> Self {
        match self {
            Panel::Dialogs => Panel::Folders,
            Panel::Folders => Panel::Dialogs,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AppSettings {
    pub page_size: usize,
    pub ascii_width: NonZeroU32,
    pub media_timeout: Duration,
}

impl AppSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            page_size: config.page_size(),
            ascii_width: config.ascii_width(),
            media_timeout: Duration::from_secs(MEDIA_RENDER_TIMEOUT_SECS),
        }
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            ascii_width: self.ascii_width,
            media_timeout: self.media_timeout,
        }
    }
}

pub struct App {
    pub folders: Vec<FolderInfo>,
    pub folder_selection: usize,
    /// Folder the dialog list is filtered to; `None` shows all chats.
    pub active_folder: Option<i32>,
    pub dialogs: Vec<Dialog>,
    pub dialog_selection: usize,
    pub focus: Panel,
    pub chat: Option<ChatView>,
    pub live: MessageCache,
    pub loading: bool,
    pub error: Option<String>,
    pub status: Option<String>,
    pub status_set_at: Option<Instant>,
    pub exit_requested: bool,
    pub settings: AppSettings,
    pub theme: Theme,
}

impl App {
    pub fn new(settings: AppSettings, theme: Theme) -> Self {
        Self {
            folders: Vec::new(),
            folder_selection: 0,
            active_folder: None,
            dialogs: Vec::new(),
            dialog_selection: 0,
            focus: Panel::Dialogs,
            chat: None,
            live: MessageCache::new(),
            loading: true,
            error: None,
            status: None,
            status_set_at: None,
            exit_requested: false,
            settings,
            theme,
        }
    }

    pub fn selected_dialog(&self) -> Option<&Dialog> {
        self.dialogs.get(self.dialog_selection)
    }

    pub fn selected_folder(&self) -> Option<&FolderInfo> {
        self.folders.get(self.folder_selection)
    }

    pub fn active_folder_title(&self) -> Option<&str> {
        self.active_folder.and_then(|id| {
            self.folders
                .iter()
                .find(|folder| folder.id == Some(id))
                .map(|folder| folder.title.as_str())
        })
    }

    pub fn is_chat_open(&self, chat_id: i64) -> bool {
        self.chat.as_ref().is_some_and(|chat| chat.chat_id() == chat_id)
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
        self.status_set_at = Some(Instant::now());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
        self.status_set_at = None;
    }

    pub fn move_selection(&mut self, delta: isize) {
        let (selection, len) = match self.focus {
            Panel::Dialogs => (&mut self.dialog_selection, self.dialogs.len()),
            Panel::Folders => (&mut self.folder_selection, self.folders.len()),
        };
        *selection = step_index(*selection, delta, len);
    }

    pub(crate) fn clamp_selections(&mut self) {
        self.dialog_selection = self
            .dialog_selection
            .min(self.dialogs.len().saturating_sub(1));
        self.folder_selection = self
            .folder_selection
            .min(self.folders.len().saturating_sub(1));
    }

    #[cfg(test)]
    pub fn new_test_app() -> Self {
        Self::new(
            AppSettings {
                page_size: 20,
                ascii_width: NonZeroU32::new(8).expect("width"),
                media_timeout: Duration::from_secs(5),
            },
            Theme::dark_default(),
        )
    }
}

fn step_index(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let last = len - 1;
    if delta.is_negative() {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta.unsigned_abs()).min(last)
    }
}

/// Shared, async-locked access to the [`App`] for the event loop and its tasks.
#[derive(Clone)]
pub struct AppHandle {
    inner: Arc<Mutex<App>>,
}

impl AppHandle {
    pub fn new(app: App) -> Self {
        Self {
            inner: Arc::new(Mutex::new(app)),
        }
    }

    pub async fn read<R>(&self, f: impl FnOnce(&App) -> R) -> R {
        let guard = self.inner.lock().await;
        f(&guard)
    }

    pub async fn update<R>(&self, f: impl FnOnce(&mut App) -> R) -> R {
        let mut guard = self.inner.lock().await;
        f(&mut guard)
    }
}
