//! Background execution of [`AppCommand`]s against the chat backend.
//!
//! Each command runs in its own task and reports back by dispatching
//! [`AppAction`]s, so the event loop never awaits the backend directly.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::client::ChatBackend;
use crate::core::app::{AppAction, AppActionDispatcher, AppCommand};
use crate::core::history::{render_messages, RenderSettings};

#[derive(Clone)]
pub struct ExecutorContext {
    pub backend: Arc<dyn ChatBackend>,
    pub dispatcher: AppActionDispatcher,
    pub render: RenderSettings,
}

impl ExecutorContext {
    pub fn spawn(&self, command: AppCommand) {
        let ctx = self.clone();
        tokio::spawn(async move {
            let actions = execute(ctx.backend.as_ref(), ctx.render, command).await;
            ctx.dispatcher.dispatch_many(actions);
        });
    }
}

pub async fn execute(
    backend: &dyn ChatBackend,
    render: RenderSettings,
    command: AppCommand,
) -> Vec<AppAction> {
    match command {
        AppCommand::RefreshAll { folder_id } => {
            let mut actions = Vec::with_capacity(2);
            match backend.fetch_folders().await {
                Ok(folders) => actions.push(AppAction::FoldersLoaded { folders }),
                Err(err) => {
                    warn!(error = %err, "failed to load folders");
                    actions.push(AppAction::LoadFailed {
                        message: err.to_string(),
                    });
                    return actions;
                }
            }
            actions.push(load_dialogs(backend, folder_id).await);
            actions
        }
        AppCommand::LoadDialogs { folder_id } => vec![load_dialogs(backend, folder_id).await],
        AppCommand::LoadMessages {
            chat_id,
            offset_id,
            limit,
        } => {
            let action = match backend.fetch_messages(chat_id, limit, offset_id).await {
                Ok(page) => {
                    debug!(chat_id, offset_id, count = page.len(), "history page loaded");
                    AppAction::MessagesLoaded {
                        chat_id,
                        offset_id,
                        messages: render_messages(backend, page, render).await,
                    }
                }
                Err(err) => {
                    warn!(chat_id, error = %err, "failed to load history");
                    AppAction::MessagesFailed {
                        chat_id,
                        message: err.to_string(),
                    }
                }
            };
            vec![action]
        }
        AppCommand::SendMessage { chat_id, text } => {
            let action = match backend.send_message(chat_id, &text).await {
                Ok(_) => AppAction::MessageSent { chat_id },
                Err(err) => {
                    warn!(chat_id, error = %err, "failed to send message");
                    AppAction::SendFailed {
                        chat_id,
                        text,
                        message: err.to_string(),
                    }
                }
            };
            vec![action]
        }
    }
}

async fn load_dialogs(backend: &dyn ChatBackend, folder_id: Option<i32>) -> AppAction {
    match backend.fetch_dialogs(folder_id).await {
        Ok(dialogs) => AppAction::DialogsLoaded { folder_id, dialogs },
        Err(err) => {
            warn!(?folder_id, error = %err, "failed to load dialogs");
            AppAction::LoadFailed {
                message: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::archive::ArchiveFile;
    use crate::client::ArchiveBackend;
    use std::num::NonZeroU32;
    use std::time::Duration;
    use tempfile::TempDir;

    fn backend(dir: &TempDir) -> ArchiveBackend {
        let archive: ArchiveFile = serde_json::from_value(serde_json::json!({
            "me": { "id": 1, "first_name": "Me" },
            "folders": [ { "id": 5, "title": "Family" } ],
            "chats": [
                {
                    "id": 2, "kind": "user", "first_name": "Mum", "folder_id": 5,
                    "messages": [
                        { "id": 1, "from_id": 2, "date": "2024-02-01T08:00:00Z", "text": "hi" },
                        { "id": 2, "from_id": 1, "date": "2024-02-01T08:01:00Z", "text": "hello" }
                    ]
                },
                { "id": -9, "kind": "channel", "title": "News" }
            ]
        }))
        .expect("archive");
        ArchiveBackend::from_archive(
            archive,
            &dir.path().join("archive.json"),
            &dir.path().join("session.json"),
        )
        .without_persistence()
    }

    fn render() -> RenderSettings {
        RenderSettings {
            ascii_width: NonZeroU32::new(10).expect("width"),
            media_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn refresh_loads_folders_then_dialogs() {
        let dir = TempDir::new().expect("temp dir");
        let backend = backend(&dir);
        let actions = execute(&backend, render(), AppCommand::RefreshAll { folder_id: Some(5) }).await;
        assert_eq!(actions.len(), 2);
        match &actions[0] {
            AppAction::FoldersLoaded { folders } => assert_eq!(folders.len(), 2),
            _ => panic!("expected folders first"),
        }
        match &actions[1] {
            AppAction::DialogsLoaded { folder_id, dialogs } => {
                assert_eq!(*folder_id, Some(5));
                assert_eq!(dialogs.len(), 1);
                assert_eq!(dialogs[0].display_name(), "Mum");
            }
            _ => panic!("expected dialogs"),
        }
    }

    #[tokio::test]
    async fn history_is_rendered_with_sender_names() {
        let dir = TempDir::new().expect("temp dir");
        let backend = backend(&dir);
        let actions = execute(
            &backend,
            render(),
            AppCommand::LoadMessages {
                chat_id: 2,
                offset_id: 0,
                limit: 10,
            },
        )
        .await;
        match actions.as_slice() {
            [AppAction::MessagesLoaded {
                chat_id: 2,
                offset_id: 0,
                messages,
            }] => {
                let senders: Vec<&str> = messages.iter().map(|m| m.sender.as_str()).collect();
                assert_eq!(senders, vec!["Me", "Mum"]);
            }
            _ => panic!("expected a loaded page"),
        }
    }

    #[tokio::test]
    async fn missing_chat_reports_failure() {
        let dir = TempDir::new().expect("temp dir");
        let backend = backend(&dir);
        let actions = execute(
            &backend,
            render(),
            AppCommand::LoadMessages {
                chat_id: 404,
                offset_id: 0,
                limit: 10,
            },
        )
        .await;
        assert!(matches!(
            actions.as_slice(),
            [AppAction::MessagesFailed { chat_id: 404, message }] if message.contains("not found")
        ));

        let actions = execute(
            &backend,
            render(),
            AppCommand::SendMessage {
                chat_id: 404,
                text: "lost".into(),
            },
        )
        .await;
        assert!(matches!(
            actions.as_slice(),
            [AppAction::SendFailed { chat_id: 404, text, .. }] if text == "lost"
        ));
    }

    #[tokio::test]
    async fn sending_reports_success() {
        let dir = TempDir::new().expect("temp dir");
        let backend = backend(&dir);
        let actions = execute(
            &backend,
            render(),
            AppCommand::SendMessage {
                chat_id: -9,
                text: "breaking".into(),
            },
        )
        .await;
        assert!(matches!(actions.as_slice(), [AppAction::MessageSent { chat_id: -9 }]));
    }
}
