use std::io::{self, BufRead, Write};

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use super::{AuthError, Prompter};

/// Prompts on stdout and reads answers from stdin.
pub struct TerminalPrompter;

fn prompt_error(err: io::Error) -> AuthError {
    AuthError::Prompt(err.to_string())
}

impl Prompter for TerminalPrompter {
    fn prompt(&mut self, label: &str) -> Result<String, AuthError> {
        print!("{label}");
        io::stdout().flush().map_err(prompt_error)?;

        let mut input = String::new();
        let read = io::stdin().lock().read_line(&mut input).map_err(prompt_error)?;
        if read == 0 {
            return Err(AuthError::Cancelled);
        }
        Ok(input.trim_end_matches(['\r', '\n']).to_string())
    }

    fn prompt_secret(&mut self, label: &str) -> Result<String, AuthError> {
        print!("{label}");
        io::stdout().flush().map_err(prompt_error)?;

        enable_raw_mode().map_err(prompt_error)?;
        let result = read_masked_line();
        let _ = disable_raw_mode();
        println!();
        result
    }

    fn notify(&mut self, message: &str) {
        println!("{message}");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MaskedKeyOutcome {
    Echo(&'static str),
    Ignore,
    Submit,
    Cancel,
}

/// Applies one key press to a hidden input buffer.
pub(crate) fn apply_masked_key(buffer: &mut String, key: &KeyEvent) -> MaskedKeyOutcome {
    match key.code {
        KeyCode::Enter => MaskedKeyOutcome::Submit,
        KeyCode::Esc => MaskedKeyOutcome::Cancel,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            MaskedKeyOutcome::Cancel
        }
        KeyCode::Backspace => {
            if buffer.pop().is_some() {
                MaskedKeyOutcome::Echo("\x08 \x08")
            } else {
                MaskedKeyOutcome::Ignore
            }
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            buffer.push(c);
            MaskedKeyOutcome::Echo("*")
        }
        _ => MaskedKeyOutcome::Ignore,
    }
}

fn read_masked_line() -> Result<String, AuthError> {
    let mut buffer = String::new();
    let mut stdout = io::stdout();
    loop {
        let Event::Key(key) = event::read().map_err(prompt_error)? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match apply_masked_key(&mut buffer, &key) {
            MaskedKeyOutcome::Echo(text) => {
                write!(stdout, "{text}").map_err(prompt_error)?;
                stdout.flush().map_err(prompt_error)?;
            }
            MaskedKeyOutcome::Ignore => {}
            MaskedKeyOutcome::Submit => return Ok(buffer),
            MaskedKeyOutcome::Cancel => return Err(AuthError::Cancelled),
        }
    }
}
