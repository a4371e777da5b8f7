pub mod app;
pub mod config;
pub mod constants;
pub mod history;
pub mod text_wrapping;
