use tracing::debug;

use super::{App, AppAction, AppCommand};

pub(super) fn handle_chat_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    let page_size = app.settings.page_size;
    match action {
        AppAction::CloseChat => {
            app.chat.take()?;
            app.loading = true;
            Some(AppCommand::RefreshAll {
                folder_id: app.active_folder,
            })
        }
        AppAction::MessagesLoaded {
            chat_id,
            offset_id,
            messages,
        } => {
            if !app.is_chat_open(chat_id) {
                debug!(chat_id, "dropping history for a closed chat");
                return None;
            }
            if offset_id > 0 && messages.is_empty() {
                app.set_status("No older messages");
            }
            let chat = app.chat.as_mut()?;
            chat.loading = false;
            chat.error = None;
            if offset_id > 0 {
                chat.prepend_history(messages);
            } else {
                chat.replace_history(messages);
            }
            if !chat.reload_pending {
                return None;
            }
            chat.reload_pending = false;
            chat.loading = true;
            Some(AppCommand::LoadMessages {
                chat_id,
                offset_id: 0,
                limit: page_size,
            })
        }
        AppAction::MessagesFailed { chat_id, message } => {
            if !app.is_chat_open(chat_id) {
                return None;
            }
            let chat = app.chat.as_mut()?;
            chat.loading = false;
            chat.reload_pending = false;
            chat.error = Some(format!("Error loading messages: {message}"));
            None
        }
        AppAction::LoadOlder => {
            let chat = app.chat.as_mut()?;
            if chat.loading {
                return None;
            }
            let offset_id = chat.oldest_id()?;
            chat.loading = true;
            Some(AppCommand::LoadMessages {
                chat_id: chat.chat_id(),
                offset_id,
                limit: page_size,
            })
        }
        AppAction::SubmitMessage => {
            let chat = app.chat.as_mut()?;
            if chat.sending {
                return None;
            }
            let text = chat.input_text().trim().to_string();
            if text.is_empty() {
                return None;
            }
            chat.clear_input();
            chat.sending = true;
            chat.error = None;
            Some(AppCommand::SendMessage {
                chat_id: chat.chat_id(),
                text,
            })
        }
        AppAction::MessageSent { chat_id } => {
            if !app.is_chat_open(chat_id) {
                return None;
            }
            let chat = app.chat.as_mut()?;
            chat.sending = false;
            if chat.loading {
                chat.reload_pending = true;
                return None;
            }
            chat.reload_pending = false;
            chat.loading = true;
            Some(AppCommand::LoadMessages {
                chat_id,
                offset_id: 0,
                limit: page_size,
            })
        }
        AppAction::SendFailed {
            chat_id,
            text,
            message,
        } => {
            if !app.is_chat_open(chat_id) {
                return None;
            }
            let chat = app.chat.as_mut()?;
            chat.sending = false;
            chat.error = Some(format!("Error sending message: {message}"));
            if chat.input_text().is_empty() {
                chat.input.insert_str(text);
            }
            None
        }
        AppAction::ScrollChat { rows } => {
            let chat = app.chat.as_mut()?;
            let amount = u16::try_from(rows.unsigned_abs()).unwrap_or(u16::MAX);
            if rows >= 0 {
                chat.scroll.scroll_up(amount);
            } else {
                chat.scroll.scroll_down(amount);
            }
            None
        }
        AppAction::InputKey { key } => {
            let chat = app.chat.as_mut()?;
            chat.input.input(tui_textarea::Input::from(key));
            None
        }
        _ => unreachable!("non-chat action routed to chat handler"),
    }
}
