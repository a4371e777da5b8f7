mod chat;
mod navigation;

use ratatui::crossterm::event::KeyEvent;
use tokio::sync::mpsc;

use super::App;
use crate::client::{ChatMessage, Dialog, FolderInfo};
use crate::core::history::RenderedMessage;

pub enum AppAction {
    Refresh,
    FoldersLoaded {
        folders: Vec<FolderInfo>,
    },
    DialogsLoaded {
        folder_id: Option<i32>,
        dialogs: Vec<Dialog>,
    },
    LoadFailed {
        message: String,
    },
    SwitchPanel,
    MoveSelection {
        delta: isize,
    },
    Activate,
    IncomingMessage {
        message: ChatMessage,
    },
    ClearStatus,
    Quit,

    CloseChat,
    MessagesLoaded {
        chat_id: i64,
        offset_id: i32,
        messages: Vec<RenderedMessage>,
    },
    MessagesFailed {
        chat_id: i64,
        message: String,
    },
    LoadOlder,
    SubmitMessage,
    MessageSent {
        chat_id: i64,
    },
    SendFailed {
        chat_id: i64,
        text: String,
        message: String,
    },
    /// Positive values scroll towards older messages.
    ScrollChat {
        rows: i32,
    },
    InputKey {
        key: KeyEvent,
    },
}

#[derive(Clone)]
pub struct AppActionDispatcher {
    tx: mpsc::UnboundedSender<AppAction>,
}

impl AppActionDispatcher {
    pub fn new(tx: mpsc::UnboundedSender<AppAction>) -> Self {
        Self { tx }
    }

    pub fn dispatch(&self, action: AppAction) {
        self.dispatch_many([action]);
    }

    pub fn dispatch_many<I>(&self, actions: I)
    where
        I: IntoIterator<Item = AppAction>,
    {
        for action in actions.into_iter() {
            // The receiver only goes away while shutting down.
            let _ = self.tx.send(action);
        }
    }
}

/// Background work requested by an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    RefreshAll {
        folder_id: Option<i32>,
    },
    LoadDialogs {
        folder_id: Option<i32>,
    },
    LoadMessages {
        chat_id: i64,
        offset_id: i32,
        limit: usize,
    },
    SendMessage {
        chat_id: i64,
        text: String,
    },
}

pub fn apply_actions(app: &mut App, actions: impl IntoIterator<Item = AppAction>) -> Vec<AppCommand> {
    let mut commands = Vec::new();
    for action in actions {
        if let Some(cmd) = apply_action(app, action) {
            commands.push(cmd);
        }
    }
    commands
}

pub fn apply_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::Refresh
        | AppAction::FoldersLoaded { .. }
        | AppAction::DialogsLoaded { .. }
        | AppAction::LoadFailed { .. }
        | AppAction::SwitchPanel
        | AppAction::MoveSelection { .. }
        | AppAction::Activate
        | AppAction::IncomingMessage { .. }
        | AppAction::ClearStatus
        | AppAction::Quit => navigation::handle_navigation_action(app, action),

        AppAction::CloseChat
        | AppAction::MessagesLoaded { .. }
        | AppAction::MessagesFailed { .. }
        | AppAction::LoadOlder
        | AppAction::SubmitMessage
        | AppAction::MessageSent { .. }
        | AppAction::SendFailed { .. }
        | AppAction::ScrollChat { .. }
        | AppAction::InputKey { .. } => chat::handle_chat_action(app, action),
    }
}
