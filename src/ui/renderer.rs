//! Frame composition for the main screen and the chat view.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::client::ALL_CHATS_TITLE;
use crate::core::app::{App, ChatView, Panel};
use crate::core::text_wrapping::{TextWrapper, WrapConfig};
use crate::ui::theme::Theme;

const MAIN_HELP: &str = "Tab: switch panel  ↑↓: navigate  Enter: open  r: refresh  q: quit";
const CHAT_HELP: &str =
    "Enter: send  Esc: back  Ctrl+L: older messages  PgUp/PgDn: scroll  Ctrl+Q: quit";
const INPUT_HEIGHT: u16 = 3;

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    let header = match &app.chat {
        Some(chat) => format!(" {} ", chat.title),
        None => format!(
            " tgconsole v{}  •  {} ",
            env!("CARGO_PKG_VERSION"),
            app.active_folder_title().unwrap_or(ALL_CHATS_TITLE)
        ),
    };
    f.render_widget(
        Paragraph::new(header).style(app.theme.header_style),
        chunks[0],
    );

    if app.chat.is_some() {
        draw_chat(f, app, chunks[1]);
    } else {
        draw_main(f, app, chunks[1]);
    }

    draw_footer(f, app, chunks[2]);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if let Some(status) = &app.status {
        (status.clone(), app.theme.status_style)
    } else if let (None, Some(error)) = (&app.chat, &app.error) {
        (error.clone(), app.theme.error_style)
    } else if app.chat.is_some() {
        (CHAT_HELP.to_string(), app.theme.footer_style)
    } else {
        (MAIN_HELP.to_string(), app.theme.footer_style)
    };
    f.render_widget(Paragraph::new(format!(" {text}")).style(style), area);
}

fn panel_block<'a>(title: &'a str, focused: bool, theme: &Theme) -> Block<'a> {
    let border_style = if focused {
        theme.focused_border_style
    } else {
        theme.unfocused_border_style
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(format!(" {title} "), theme.panel_title_style))
        .style(theme.panel_style)
}

fn draw_main(f: &mut Frame, app: &App, area: Rect) {
    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let theme = &app.theme;
    let dialog_items: Vec<ListItem> = if app.dialogs.is_empty() {
        let placeholder = if app.loading {
            "Loading chats..."
        } else {
            "No chats"
        };
        vec![ListItem::new(placeholder)]
    } else {
        app.dialogs
            .iter()
            .map(|dialog| {
                let mut spans = vec![Span::raw(dialog.display_name())];
                if dialog.unread_count > 0 {
                    spans.push(Span::styled(
                        format!(" ({} unread)", dialog.unread_count),
                        theme.unread_style,
                    ));
                }
                let live = app.live.count(dialog.chat_id);
                if live > 0 {
                    spans.push(Span::styled(format!(" +{live}"), theme.live_badge_style));
                }
                if let Some(latest) = app.live.recent(dialog.chat_id).next() {
                    let preview = latest.text.lines().next().unwrap_or_default();
                    if !preview.is_empty() {
                        spans.push(Span::styled(format!(": {preview}"), theme.time_style));
                    }
                }
                ListItem::new(Line::from(spans))
            })
            .collect()
    };

    let dialogs = List::new(dialog_items)
        .block(panel_block(
            "Recent Messages",
            app.focus == Panel::Dialogs,
            theme,
        ))
        .highlight_style(theme.dialog_highlight_style)
        .highlight_symbol("> ");
    let mut dialog_state = ListState::default();
    if !app.dialogs.is_empty() {
        dialog_state.select(Some(app.dialog_selection));
    }
    f.render_stateful_widget(dialogs, panels[0], &mut dialog_state);

    let folder_items: Vec<ListItem> = app
        .folders
        .iter()
        .map(|folder| {
            let style = if folder.id == app.active_folder {
                theme.folder_style.add_modifier(ratatui::style::Modifier::BOLD)
            } else {
                theme.folder_style
            };
            ListItem::new(Span::styled(folder.label(), style))
        })
        .collect();
    let folders = List::new(folder_items)
        .block(panel_block("Folders", app.focus == Panel::Folders, theme))
        .highlight_style(theme.folder_highlight_style)
        .highlight_symbol("> ");
    let mut folder_state = ListState::default();
    if !app.folders.is_empty() {
        folder_state.select(Some(app.folder_selection));
    }
    f.render_stateful_widget(folders, panels[1], &mut folder_state);
}

fn draw_chat(f: &mut Frame, app: &mut App, area: Rect) {
    let theme = app.theme.clone();
    let Some(chat) = app.chat.as_mut() else {
        return;
    };

    let error_height = u16::from(chat.error.is_some());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(error_height),
            Constraint::Length(INPUT_HEIGHT),
        ])
        .split(area);

    let lines = transcript_lines(chat, chunks[0].width, &theme);
    let viewport = usize::from(chunks[0].height);
    chat.scroll.clamp(lines.len(), viewport);
    let top = chat.scroll.top_row(lines.len(), viewport);
    let visible: Vec<Line> = lines.into_iter().skip(top).take(viewport).collect();
    f.render_widget(Paragraph::new(visible).style(theme.panel_style), chunks[0]);

    if let Some(error) = &chat.error {
        f.render_widget(
            Paragraph::new(format!(" {error}")).style(theme.error_style),
            chunks[1],
        );
    }

    let input_title = if chat.sending {
        " Sending... "
    } else {
        " Message "
    };
    chat.input.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.input_border_style)
            .title(input_title),
    );
    chat.input.set_style(theme.input_text_style);
    chat.input.set_cursor_style(theme.input_cursor_style);
    chat.input.set_cursor_line_style(Style::default());
    f.render_widget(&chat.input, chunks[2]);
}

/// Builds every display row of the transcript, oldest message first.
pub fn transcript_lines(chat: &ChatView, width: u16, theme: &Theme) -> Vec<Line<'static>> {
    let width = usize::from(width.max(1));
    let wrap = WrapConfig::new(width);

    if chat.messages.is_empty() {
        let placeholder = if chat.loading {
            "Loading messages..."
        } else {
            "No messages yet."
        };
        return vec![Line::from(Span::styled(placeholder, theme.media_style))];
    }

    let mut lines = Vec::new();
    for (idx, message) in chat.messages.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::from(Span::styled(
                "─".repeat(width),
                theme.divider_style,
            )));
        }

        lines.push(Line::from(vec![
            Span::styled(message.sender.clone(), theme.sender_style),
            Span::raw(" "),
            Span::styled(format!("[{}]", message.timestamp()), theme.time_style),
            Span::raw(":"),
        ]));

        if !message.text.is_empty() {
            lines.extend(
                TextWrapper::wrap_lines(&message.text, &wrap)
                    .into_iter()
                    .map(|row| Line::from(Span::styled(row, theme.text_style))),
            );
        }

        if let Some(media) = &message.media {
            lines.extend(
                media
                    .lines()
                    .map(|row| Line::from(Span::styled(clip_to_width(row, width), theme.media_style))),
            );
        }
    }
    lines
}

/// Cuts a row at `width` columns. Art rows must not be re-flowed.
fn clip_to_width(row: &str, width: usize) -> String {
    let mut used = 0;
    row.chars()
        .take_while(|ch| {
            used += ch.width().unwrap_or(0);
            used <= width
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Dialog, FolderInfo, Peer};
    use crate::core::app::{apply_action, AppAction};
    use crate::core::history::RenderedMessage;
    use chrono::{TimeZone, Utc};
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn buffer_text(buffer: &Buffer) -> String {
        let width = usize::from(buffer.area.width);
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn draw(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("terminal");
        terminal.draw(|f| ui(f, app)).expect("draw");
        buffer_text(terminal.backend().buffer())
    }

    fn dialog(chat_id: i64, first_name: &str, unread: u32) -> Dialog {
        Dialog {
            chat_id,
            peer: Peer::User {
                first_name: first_name.into(),
                last_name: None,
            },
            unread_count: unread,
            folder_id: None,
            last_message_date: None,
        }
    }

    fn populated_app() -> App {
        let mut app = App::new_test_app();
        apply_action(
            &mut app,
            AppAction::FoldersLoaded {
                folders: vec![
                    FolderInfo {
                        id: None,
                        title: ALL_CHATS_TITLE.into(),
                        count: 2,
                    },
                    FolderInfo {
                        id: Some(1),
                        title: "Work".into(),
                        count: 1,
                    },
                ],
            },
        );
        apply_action(
            &mut app,
            AppAction::DialogsLoaded {
                folder_id: None,
                dialogs: vec![dialog(10, "Ada", 3), dialog(11, "Grace", 0)],
            },
        );
        app
    }

    fn message(id: i32, text: &str, media: Option<&str>) -> RenderedMessage {
        RenderedMessage {
            id,
            sender: "Ada".into(),
            date: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            text: text.into(),
            media: media.map(str::to_string),
        }
    }

    #[test]
    fn main_view_lists_dialogs_and_folders() {
        let mut app = populated_app();
        app.live.record(crate::client::ChatMessage {
            id: 1,
            chat_id: 11,
            from_id: None,
            date: Utc.timestamp_opt(0, 0).unwrap(),
            text: "hey".into(),
            media: None,
        });
        let screen = draw(&mut app, 80, 12);
        assert!(screen.contains("Recent Messages"));
        assert!(screen.contains("Folders"));
        assert!(screen.contains("Ada (3 unread)"));
        assert!(screen.contains("Grace +1: hey"));
        assert!(screen.contains("All Chats (2)"));
        assert!(screen.contains("Work (1)"));
        assert!(screen.contains("q: quit"));
    }

    #[test]
    fn chat_view_shows_transcript_and_input() {
        let mut app = populated_app();
        apply_action(&mut app, AppAction::Activate);
        apply_action(
            &mut app,
            AppAction::MessagesLoaded {
                chat_id: 10,
                offset_id: 0,
                messages: vec![message(2, "second", Some("@@@@")), message(1, "first", None)],
            },
        );
        let screen = draw(&mut app, 60, 16);
        assert!(screen.contains(" Ada "));
        let first = screen.find("first").expect("first message");
        let second = screen.find("second").expect("second message");
        assert!(first < second, "oldest message is drawn first");
        assert!(screen.contains("@@@@"));
        assert!(screen.contains("────"));
        assert!(screen.contains("Message"));
        assert!(screen.contains("Esc: back"));
    }

    #[test]
    fn history_error_is_shown_above_input() {
        let mut app = populated_app();
        apply_action(&mut app, AppAction::Activate);
        apply_action(
            &mut app,
            AppAction::MessagesFailed {
                chat_id: 10,
                message: "boom".into(),
            },
        );
        let screen = draw(&mut app, 60, 12);
        assert!(screen.contains("Error loading messages: boom"));
    }

    #[test]
    fn transcript_rows_follow_message_layout() {
        let mut chat = ChatView::new(dialog(1, "Ada", 0));
        chat.replace_history(vec![
            message(2, "", Some("[Image format not supported]")),
            message(1, "hello world again", None),
        ]);
        let theme = Theme::dark_default();
        let rows: Vec<String> = transcript_lines(&chat, 12, &theme)
            .iter()
            .map(|line| line.to_string())
            .collect();
        assert!(rows[0].starts_with("Ada ["));
        assert!(rows[0].ends_with("]:"));
        assert_eq!(rows[1], "hello world");
        assert_eq!(rows[2], "again");
        assert_eq!(rows[3], "─".repeat(12));
        assert_eq!(rows[5], "[Image forma");
    }

    #[test]
    fn scrolling_up_reveals_older_rows() {
        let mut app = populated_app();
        apply_action(&mut app, AppAction::Activate);
        let page: Vec<RenderedMessage> = (1..=20)
            .rev()
            .map(|id| message(id, &format!("body {id}"), None))
            .collect();
        apply_action(
            &mut app,
            AppAction::MessagesLoaded {
                chat_id: 10,
                offset_id: 0,
                messages: page,
            },
        );
        let screen = draw(&mut app, 40, 12);
        assert!(screen.contains("body 20"));
        assert!(!screen.contains("body 1\n") && !screen.contains("body 1 "));

        apply_action(&mut app, AppAction::ScrollChat { rows: 1000 });
        let screen = draw(&mut app, 40, 12);
        assert!(screen.contains("body 1 "));
        let from_bottom = app.chat.as_ref().expect("chat").scroll.from_bottom;
        assert!(from_bottom < 1000, "scroll is clamped to the transcript");
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let mut app = populated_app();
        draw(&mut app, 10, 3);
        apply_action(&mut app, AppAction::Activate);
        draw(&mut app, 10, 3);
    }
}
