//! Interactive sign-in against a [`ChatBackend`].
//!
//! The flow mirrors the remote service: phone number, then the login code
//! delivered to the user's other devices, then the two-factor password when
//! the account has one. Prompts go through [`Prompter`] so the flow can be
//! driven by the terminal or by a script.

pub mod ui;

use std::fmt;

use tracing::info;

use crate::client::{ChatBackend, ClientError, SignInOutcome};

pub use self::ui::TerminalPrompter;

pub const PHONE_PROMPT: &str = "Enter your phone number (with country code): ";
pub const CODE_PROMPT: &str = "Enter the verification code sent to your phone or app: ";
pub const PASSWORD_PROMPT: &str = "Enter your 2FA password: ";

#[derive(Debug)]
pub enum AuthError {
    /// The user aborted a prompt.
    Cancelled,
    /// Reading from the prompt failed.
    Prompt(String),
    /// The backend rejected a step.
    Backend(ClientError),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Cancelled => write!(f, "Authentication cancelled"),
            AuthError::Prompt(reason) => write!(f, "Authentication failed: {reason}"),
            AuthError::Backend(err) => write!(f, "Authentication failed: {err}"),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ClientError> for AuthError {
    fn from(err: ClientError) -> Self {
        AuthError::Backend(err)
    }
}

pub trait Prompter: Send {
    fn prompt(&mut self, label: &str) -> Result<String, AuthError>;

    /// Like [`Prompter::prompt`] but without echoing the answer.
    fn prompt_secret(&mut self, label: &str) -> Result<String, AuthError>;

    fn notify(&mut self, message: &str);
}

/// Runs the sign-in flow unless the backend already has a session.
///
/// Returns `true` when a new sign-in happened.
pub async fn ensure_authorized(
    backend: &dyn ChatBackend,
    prompter: &mut dyn Prompter,
) -> Result<bool, AuthError> {
    if backend.is_authorized().await? {
        return Ok(false);
    }

    prompter.notify("Authentication required.");

    let phone = prompter.prompt(PHONE_PROMPT)?;
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(AuthError::Cancelled);
    }
    let token = backend.request_login_code(phone).await?;

    let code = prompter.prompt(CODE_PROMPT)?;
    match backend.sign_in(&token, code.trim()).await? {
        SignInOutcome::Authorized => {}
        SignInOutcome::PasswordRequired => {
            let password = prompter.prompt_secret(PASSWORD_PROMPT)?;
            backend.check_password(&password).await?;
        }
    }

    info!("signed in");
    prompter.notify("Authentication successful!");
    Ok(true)
}
