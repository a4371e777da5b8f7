//! Terminal UI layer.
//!
//! - [`chat_loop`]: terminal lifecycle, input routing and the event loop.
//! - [`renderer`]: frame composition for the dialog list and the chat view.
//! - [`theme`]: the color palette.
//!
//! This layer presents and captures interaction state; [`crate::core`] owns
//! the state transitions and [`crate::client`] the data.

pub mod chat_loop;
pub mod renderer;
pub mod theme;
