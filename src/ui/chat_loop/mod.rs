//! Main console event loop.
//!
//! Owns the terminal for the lifetime of an interactive session and drives
//! the [`App`](crate::core::app::App) through the action dispatcher.

mod event_loop;
mod executors;
mod keybindings;
mod lifecycle;

pub use event_loop::run_console;
