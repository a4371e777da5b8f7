//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod render;

use std::error::Error;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::auth::{ensure_authorized, TerminalPrompter};
use crate::client::ArchiveBackend;
use crate::core::app::{App, AppHandle, AppSettings};
use crate::core::config::{path_display, Config};
use crate::core::constants::MAX_ASCII_ART_WIDTH;
use crate::logging::init_tracing;
use crate::ui::chat_loop::run_console;
use crate::ui::theme::Theme;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nbuilt ",
    env!("VERGEN_BUILD_DATE"),
    " for ",
    env!("VERGEN_CARGO_TARGET_TRIPLE"),
    " with rustc ",
    env!("VERGEN_RUSTC_SEMVER"),
);

#[derive(Parser)]
#[command(name = "tgconsole")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "A full-screen terminal chat client with ASCII-art image previews")]
#[command(
    long_about = "tgconsole is a full-screen terminal chat client. It lists your recent chats and \
folders, shows message history, and lets you reply. Image attachments are drawn as ASCII art.\n\n\
Main screen:\n\
  Tab               Switch between chats and folders\n\
  Up/Down           Move the selection\n\
  Enter             Open a chat or filter by folder\n\
  r                 Refresh\n\
  q, Ctrl+Q         Quit\n\n\
Chat view:\n\
  Enter             Send the message\n\
  Ctrl+L            Load older messages\n\
  Up/Down/PgUp/PgDn Scroll\n\
  Esc               Back to the chat list\n\n\
Environment Variables:\n\
  TGCONSOLE_LOG     Log filter used with --log (default: info)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Chat archive to open (overrides the configured archive)
    #[arg(short = 'a', long, global = true, value_name = "PATH")]
    pub archive: Option<PathBuf>,

    /// Write diagnostic logs to the specified file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Width of image renderings in characters
    #[arg(short = 'w', long, global = true, value_name = "N", value_parser = parse_width)]
    pub width: Option<NonZeroU32>,
}

fn parse_width(input: &str) -> Result<NonZeroU32, String> {
    let width: NonZeroU32 = input
        .parse()
        .map_err(|_| format!("expected a positive integer, got '{input}'"))?;
    if width.get() > MAX_ASCII_ART_WIDTH {
        return Err(format!("width must be at most {MAX_ASCII_ART_WIDTH}"));
    }
    Ok(width)
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Print an image file as ASCII art
    Render {
        /// Image file to render
        image: PathBuf,
    },
    /// Set a configuration value
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Reset a configuration value to its default
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Show the effective configuration
    Config,
    /// Forget the saved session
    Logout,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Some(log) = &args.log {
        init_tracing(log)?;
    }

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let mut config = Config::load()?;
            if let Some(width) = args.width {
                config.ascii_art_width = width.get();
            }
            run_chat(config, args.archive).await
        }
        Commands::Render { image } => {
            let config = Config::load()?;
            let width = args.width.unwrap_or_else(|| config.ascii_width());
            let art = render::render_file(&image, width)?;
            println!("{art}");
            Ok(())
        }
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            if value.is_empty() {
                config.print_all();
                return Ok(());
            }
            let stored = config.set_value(&key, &value.join(" "))?;
            config.save()?;
            println!("✅ Set {key} to: {stored}");
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            config.unset_value(&key)?;
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
        Commands::Config => {
            let config = Config::load()?;
            println!("Config file: {}", path_display(Config::get_config_path()?));
            config.print_all();
            Ok(())
        }
        Commands::Logout => {
            let config = Config::load()?;
            logout(&config.session_path()?)
        }
    }
}

async fn run_chat(config: Config, archive: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let archive = archive.or_else(|| config.archive.clone()).ok_or(
        "No chat archive configured. Pass --archive PATH or run `tgconsole set archive PATH`.",
    )?;
    let session_path = config.session_path()?;

    println!("Opening {}...", path_display(&archive));
    let backend = Arc::new(ArchiveBackend::open(&archive, &session_path)?);
    ensure_authorized(backend.as_ref(), &mut TerminalPrompter).await?;

    info!(archive = %archive.display(), "starting console");
    let app = AppHandle::new(App::new(
        AppSettings::from_config(&config),
        Theme::dark_default(),
    ));
    run_console(backend, app).await
}

fn logout(session_path: &Path) -> Result<(), Box<dyn Error>> {
    match std::fs::remove_file(session_path) {
        Ok(()) => {
            println!("✅ Logged out (removed {})", path_display(session_path));
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            println!("No saved session at {}", path_display(session_path));
            Ok(())
        }
        Err(err) => Err(format!(
            "Failed to remove session file {}: {err}",
            path_display(session_path)
        )
        .into()),
    }
}
