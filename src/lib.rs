//! tgconsole is a full-screen terminal client for browsing and replying to
//! chats, with image attachments drawn as ASCII art.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`media`] turns encoded images into brightness-mapped glyph grids.
//! - [`client`] defines the [`client::ChatBackend`] capabilities the console
//!   consumes, with a JSON archive implementation and a live message cache.
//! - [`auth`] drives the phone/code/password sign-in flow.
//! - [`core`] owns configuration, application state and the actions that
//!   change it.
//! - [`ui`] renders the terminal interface and runs the event loop.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`].

pub mod auth;
pub mod cli;
pub mod client;
pub mod core;
pub mod logging;
pub mod media;
pub mod ui;
pub mod utils;
