use tracing::debug;

use super::{App, AppAction, AppCommand};
use crate::core::app::{ChatView, Panel};

pub(super) fn handle_navigation_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::Refresh => {
            app.loading = true;
            app.error = None;
            Some(AppCommand::RefreshAll {
                folder_id: app.active_folder,
            })
        }
        AppAction::FoldersLoaded { folders } => {
            app.folders = folders;
            app.clamp_selections();
            None
        }
        AppAction::DialogsLoaded { folder_id, dialogs } => {
            if folder_id != app.active_folder {
                debug!(?folder_id, "dropping dialogs for a folder that is no longer active");
                return None;
            }
            app.dialogs = dialogs;
            app.loading = false;
            app.error = None;
            app.clamp_selections();
            None
        }
        AppAction::LoadFailed { message } => {
            app.loading = false;
            app.error = Some(format!("Error loading chats: {message}"));
            None
        }
        AppAction::SwitchPanel => {
            app.focus = app.focus.toggled();
            None
        }
        AppAction::MoveSelection { delta } => {
            app.move_selection(delta);
            None
        }
        AppAction::Activate => activate_selection(app),
        AppAction::IncomingMessage { message } => {
            if app.is_chat_open(message.chat_id) {
                let chat = app.chat.as_mut()?;
                if chat.loading || chat.sending {
                    chat.reload_pending = true;
                    return None;
                }
                chat.loading = true;
                return Some(AppCommand::LoadMessages {
                    chat_id: message.chat_id,
                    offset_id: 0,
                    limit: app.settings.page_size,
                });
            }
            app.live.record(message);
            if app.chat.is_some() {
                return None;
            }
            Some(AppCommand::RefreshAll {
                folder_id: app.active_folder,
            })
        }
        AppAction::ClearStatus => {
            app.clear_status();
            None
        }
        AppAction::Quit => {
            app.exit_requested = true;
            None
        }
        _ => unreachable!("non-navigation action routed to navigation handler"),
    }
}

fn activate_selection(app: &mut App) -> Option<AppCommand> {
    match app.focus {
        Panel::Dialogs => {
            let dialog = app.selected_dialog()?.clone();
            let chat_id = dialog.chat_id;
            let seen = app.live.clear(chat_id);
            debug!(chat_id, seen, "opening chat");
            app.chat = Some(ChatView::new(dialog));
            app.clear_status();
            Some(AppCommand::LoadMessages {
                chat_id,
                offset_id: 0,
                limit: app.settings.page_size,
            })
        }
        Panel::Folders => {
            let folder_id = app.selected_folder()?.id;
            app.active_folder = folder_id;
            app.focus = Panel::Dialogs;
            app.dialog_selection = 0;
            app.loading = true;
            Some(AppCommand::LoadDialogs { folder_id })
        }
    }
}
