use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Chrome
    pub header_style: Style,
    pub footer_style: Style,
    pub panel_style: Style,
    pub panel_title_style: Style,
    pub focused_border_style: Style,
    pub unfocused_border_style: Style,

    // Lists
    pub dialog_highlight_style: Style,
    pub unread_style: Style,
    pub live_badge_style: Style,
    pub folder_style: Style,
    pub folder_highlight_style: Style,

    // Chat transcript
    pub sender_style: Style,
    pub time_style: Style,
    pub text_style: Style,
    pub media_style: Style,
    pub divider_style: Style,

    // Status lines
    pub status_style: Style,
    pub error_style: Style,

    // Input area
    pub input_border_style: Style,
    pub input_text_style: Style,
    pub input_cursor_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            header_style: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            footer_style: Style::default().fg(Color::White).bg(Color::Blue),
            panel_style: Style::default().fg(Color::White).bg(Color::Black),
            panel_title_style: Style::default().fg(Color::White).bg(Color::Blue),
            focused_border_style: Style::default().fg(Color::LightBlue),
            unfocused_border_style: Style::default().fg(Color::DarkGray),

            dialog_highlight_style: Style::default().fg(Color::White).bg(Color::Blue),
            unread_style: Style::default().fg(Color::LightRed),
            live_badge_style: Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
            folder_style: Style::default().fg(Color::Yellow),
            folder_highlight_style: Style::default().fg(Color::Black).bg(Color::Yellow),

            sender_style: Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
            time_style: Style::default().fg(Color::Cyan),
            text_style: Style::default().fg(Color::White),
            media_style: Style::default().fg(Color::Gray),
            divider_style: Style::default().fg(Color::DarkGray),

            status_style: Style::default().fg(Color::White).bg(Color::Green),
            error_style: Style::default().fg(Color::White).bg(Color::Red),

            input_border_style: Style::default().fg(Color::Gray),
            input_text_style: Style::default().fg(Color::White),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark_default()
    }
}
