//! Context-aware key bindings.
//!
//! Keys are resolved against the screen that currently has focus. In the chat
//! view, keys without a binding are forwarded to the message input.

use std::collections::HashMap;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::app::{App, AppAction, Panel};
use crate::core::constants::PAGE_SCROLL_LINES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Dialogs,
    Folders,
    Chat,
}

impl KeyContext {
    pub fn for_app(app: &App) -> Self {
        if app.chat.is_some() {
            return KeyContext::Chat;
        }
        match app.focus {
            Panel::Dialogs => KeyContext::Dialogs,
            Panel::Folders => KeyContext::Folders,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPattern {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyPattern {
    pub fn simple(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }
}

impl From<&KeyEvent> for KeyPattern {
    fn from(key: &KeyEvent) -> Self {
        Self {
            code: key.code,
            modifiers: key.modifiers,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Quit,
    SwitchPanel,
    MoveUp,
    MoveDown,
    Activate,
    Refresh,
    CloseChat,
    Send,
    LoadOlder,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
}

impl KeyCommand {
    pub fn into_action(self) -> AppAction {
        let page = i32::from(PAGE_SCROLL_LINES);
        match self {
            KeyCommand::Quit => AppAction::Quit,
            KeyCommand::SwitchPanel => AppAction::SwitchPanel,
            KeyCommand::MoveUp => AppAction::MoveSelection { delta: -1 },
            KeyCommand::MoveDown => AppAction::MoveSelection { delta: 1 },
            KeyCommand::Activate => AppAction::Activate,
            KeyCommand::Refresh => AppAction::Refresh,
            KeyCommand::CloseChat => AppAction::CloseChat,
            KeyCommand::Send => AppAction::SubmitMessage,
            KeyCommand::LoadOlder => AppAction::LoadOlder,
            KeyCommand::ScrollUp => AppAction::ScrollChat { rows: 1 },
            KeyCommand::ScrollDown => AppAction::ScrollChat { rows: -1 },
            KeyCommand::PageUp => AppAction::ScrollChat { rows: page },
            KeyCommand::PageDown => AppAction::ScrollChat { rows: -page },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult {
    Command(KeyCommand),
    /// Forward the key to the message input.
    TextInput,
    NotHandled,
}

pub struct KeyRegistry {
    global: HashMap<KeyPattern, KeyCommand>,
    bindings: HashMap<KeyContext, HashMap<KeyPattern, KeyCommand>>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self {
            global: HashMap::new(),
            bindings: HashMap::new(),
        }
    }

    pub fn register_global(&mut self, pattern: KeyPattern, command: KeyCommand) {
        self.global.insert(pattern, command);
    }

    pub fn register_for_context(
        &mut self,
        context: KeyContext,
        pattern: KeyPattern,
        command: KeyCommand,
    ) {
        self.bindings
            .entry(context)
            .or_default()
            .insert(pattern, command);
    }

    pub fn resolve(&self, key: &KeyEvent, context: KeyContext) -> KeyResult {
        let pattern = KeyPattern::from(key);
        if let Some(command) = self.global.get(&pattern) {
            return KeyResult::Command(*command);
        }
        if let Some(command) = self
            .bindings
            .get(&context)
            .and_then(|bindings| bindings.get(&pattern))
        {
            return KeyResult::Command(*command);
        }
        match context {
            KeyContext::Chat => KeyResult::TextInput,
            KeyContext::Dialogs | KeyContext::Folders => KeyResult::NotHandled,
        }
    }
}

impl Default for KeyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_key_registry() -> KeyRegistry {
    let mut registry = KeyRegistry::new();

    registry.register_global(KeyPattern::ctrl(KeyCode::Char('q')), KeyCommand::Quit);
    registry.register_global(KeyPattern::ctrl(KeyCode::Char('c')), KeyCommand::Quit);

    for context in [KeyContext::Dialogs, KeyContext::Folders] {
        for (pattern, command) in [
            (KeyPattern::simple(KeyCode::Tab), KeyCommand::SwitchPanel),
            (KeyPattern::simple(KeyCode::Up), KeyCommand::MoveUp),
            (KeyPattern::simple(KeyCode::Down), KeyCommand::MoveDown),
            (KeyPattern::simple(KeyCode::Enter), KeyCommand::Activate),
            (KeyPattern::simple(KeyCode::Char('r')), KeyCommand::Refresh),
            (KeyPattern::simple(KeyCode::Char('q')), KeyCommand::Quit),
        ] {
            registry.register_for_context(context, pattern, command);
        }
    }

    for (pattern, command) in [
        (KeyPattern::simple(KeyCode::Esc), KeyCommand::CloseChat),
        (KeyPattern::simple(KeyCode::Enter), KeyCommand::Send),
        (KeyPattern::ctrl(KeyCode::Char('l')), KeyCommand::LoadOlder),
        (KeyPattern::simple(KeyCode::Up), KeyCommand::ScrollUp),
        (KeyPattern::simple(KeyCode::Down), KeyCommand::ScrollDown),
        (KeyPattern::simple(KeyCode::PageUp), KeyCommand::PageUp),
        (KeyPattern::simple(KeyCode::PageDown), KeyCommand::PageDown),
    ] {
        registry.register_for_context(KeyContext::Chat, pattern, command);
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn main_screen_bindings() {
        let registry = build_key_registry();
        for context in [KeyContext::Dialogs, KeyContext::Folders] {
            assert_eq!(
                registry.resolve(&key(KeyCode::Tab), context),
                KeyResult::Command(KeyCommand::SwitchPanel)
            );
            assert_eq!(
                registry.resolve(&key(KeyCode::Char('r')), context),
                KeyResult::Command(KeyCommand::Refresh)
            );
            assert_eq!(
                registry.resolve(&key(KeyCode::Char('q')), context),
                KeyResult::Command(KeyCommand::Quit)
            );
            assert_eq!(
                registry.resolve(&key(KeyCode::Char('x')), context),
                KeyResult::NotHandled
            );
        }
    }

    #[test]
    fn quit_shortcuts_work_everywhere() {
        let registry = build_key_registry();
        for context in [KeyContext::Dialogs, KeyContext::Folders, KeyContext::Chat] {
            assert_eq!(
                registry.resolve(&ctrl('q'), context),
                KeyResult::Command(KeyCommand::Quit)
            );
            assert_eq!(
                registry.resolve(&ctrl('c'), context),
                KeyResult::Command(KeyCommand::Quit)
            );
        }
    }

    #[test]
    fn chat_keys_fall_through_to_input() {
        let registry = build_key_registry();
        assert_eq!(
            registry.resolve(&key(KeyCode::Char('q')), KeyContext::Chat),
            KeyResult::TextInput
        );
        assert_eq!(
            registry.resolve(&key(KeyCode::Char('r')), KeyContext::Chat),
            KeyResult::TextInput
        );
        assert_eq!(
            registry.resolve(&key(KeyCode::Backspace), KeyContext::Chat),
            KeyResult::TextInput
        );
        assert_eq!(
            registry.resolve(&key(KeyCode::Enter), KeyContext::Chat),
            KeyResult::Command(KeyCommand::Send)
        );
        assert_eq!(
            registry.resolve(&ctrl('l'), KeyContext::Chat),
            KeyResult::Command(KeyCommand::LoadOlder)
        );
        assert_eq!(
            registry.resolve(&key(KeyCode::Esc), KeyContext::Chat),
            KeyResult::Command(KeyCommand::CloseChat)
        );
    }

    #[test]
    fn context_follows_app_state() {
        let mut app = App::new_test_app();
        assert_eq!(KeyContext::for_app(&app), KeyContext::Dialogs);
        app.focus = Panel::Folders;
        assert_eq!(KeyContext::for_app(&app), KeyContext::Folders);
    }

    #[test]
    fn page_commands_scroll_by_page() {
        assert!(matches!(
            KeyCommand::PageUp.into_action(),
            AppAction::ScrollChat { rows } if rows == i32::from(PAGE_SCROLL_LINES)
        ));
        assert!(matches!(
            KeyCommand::ScrollDown.into_action(),
            AppAction::ScrollChat { rows: -1 }
        ));
    }
}
