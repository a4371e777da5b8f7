//! Event polling, dispatching, and UI rendering loop.
//!
//! Terminal input is read on a spawned task and resolved through the key
//! registry into [`AppAction`]s. Actions are applied to the shared [`App`]
//! in batches; the [`AppCommand`]s they produce run as background tasks
//! that report back through the same dispatcher. Live updates from the
//! backend are forwarded into the queue as well.
//!
//! [`App`]: crate::core::app::App
//! [`AppCommand`]: crate::core::app::AppCommand

use std::{
    error::Error,
    io,
    sync::Arc,
    time::{Duration, Instant},
};

use ratatui::crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::client::{ChatBackend, Update};
use crate::core::app::{apply_actions, AppAction, AppActionDispatcher, AppHandle};
use crate::core::constants::STATUS_DISPLAY_SECS;
use crate::ui::renderer::ui;

use super::executors::ExecutorContext;
use super::keybindings::{build_key_registry, KeyContext, KeyRegistry, KeyResult};
use super::lifecycle::{restore_terminal, setup_terminal, SharedTerminal};

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        continue;
                    }
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

fn spawn_update_forwarder(
    mut updates: broadcast::Receiver<Update>,
    dispatcher: AppActionDispatcher,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(Update::NewMessage(message)) => {
                    debug!(chat_id = message.chat_id, message_id = message.id, "live message");
                    dispatcher.dispatch(AppAction::IncomingMessage { message });
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "live updates lagged; refreshing");
                    dispatcher.dispatch(AppAction::Refresh);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

async fn try_draw_frame(
    app: &AppHandle,
    terminal: &SharedTerminal,
    request_redraw: &mut bool,
    last_draw: &mut Instant,
    frame_duration: Duration,
) -> io::Result<()> {
    if !*request_redraw {
        return Ok(());
    }

    let now = Instant::now();
    if now.duration_since(*last_draw) < frame_duration {
        return Ok(());
    }

    let mut terminal_guard = terminal.lock().await;
    (app.update(|app| terminal_guard.draw(|f| ui(f, app))).await)?;
    *last_draw = now;
    *request_redraw = false;
    Ok(())
}

/// Returns `true` when any event was consumed.
async fn process_ui_events(
    app: &AppHandle,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    registry: &KeyRegistry,
    dispatcher: &AppActionDispatcher,
) -> bool {
    let mut processed = false;
    while let Ok(ev) = event_rx.try_recv() {
        processed = true;
        match ev {
            UiEvent::Crossterm(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                route_keyboard_event(app, registry, dispatcher, key).await;
            }
            UiEvent::Crossterm(_) => {}
        }
    }
    processed
}

async fn route_keyboard_event(
    app: &AppHandle,
    registry: &KeyRegistry,
    dispatcher: &AppActionDispatcher,
    key: KeyEvent,
) {
    let context = app.read(KeyContext::for_app).await;
    match registry.resolve(&key, context) {
        KeyResult::Command(command) => dispatcher.dispatch(command.into_action()),
        KeyResult::TextInput => dispatcher.dispatch(AppAction::InputKey { key }),
        KeyResult::NotHandled => {}
    }
}

async fn drain_action_queue(
    app: &AppHandle,
    executor: &ExecutorContext,
    action_rx: &mut mpsc::UnboundedReceiver<AppAction>,
) -> bool {
    let mut pending = Vec::new();
    while let Ok(action) = action_rx.try_recv() {
        pending.push(action);
    }

    if pending.is_empty() {
        return false;
    }

    let commands = app.update(|app| apply_actions(app, pending)).await;
    for command in commands {
        debug!(?command, "spawning command");
        executor.spawn(command);
    }
    true
}

async fn expire_status(app: &AppHandle) -> bool {
    let ttl = Duration::from_secs(STATUS_DISPLAY_SECS);
    app.update(|app| {
        let expired = app
            .status_set_at
            .is_some_and(|set_at| set_at.elapsed() >= ttl);
        if expired {
            app.clear_status();
        }
        expired
    })
    .await
}

pub async fn run_console(
    backend: Arc<dyn ChatBackend>,
    app: AppHandle,
) -> Result<(), Box<dyn Error>> {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<AppAction>();
    let dispatcher = AppActionDispatcher::new(action_tx);
    let render = app.read(|app| app.settings.render_settings()).await;
    let executor = ExecutorContext {
        backend: backend.clone(),
        dispatcher: dispatcher.clone(),
        render,
    };

    dispatcher.dispatch(AppAction::Refresh);
    let forwarder_handle = spawn_update_forwarder(backend.subscribe(), dispatcher.clone());

    let terminal = setup_terminal()?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);
    let registry = build_key_registry();
    info!("console started");

    const MAX_FPS: u64 = 60;
    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let mut last_draw = Instant::now() - frame_duration;
    let mut request_redraw = true;

    let result = loop {
        if app.read(|app| app.exit_requested).await {
            break Ok(());
        }

        if let Err(err) = try_draw_frame(
            &app,
            &terminal,
            &mut request_redraw,
            &mut last_draw,
            frame_duration,
        )
        .await
        {
            break Err(err.into());
        }

        let events_processed =
            process_ui_events(&app, &mut event_rx, &registry, &dispatcher).await;
        let actions_applied = drain_action_queue(&app, &executor, &mut action_rx).await;
        let status_expired = expire_status(&app).await;

        if events_processed || actions_applied || status_expired {
            request_redraw = true;
        } else {
            tokio::time::sleep(Duration::from_millis(16)).await;
        }
    };

    event_reader_handle.abort();
    forwarder_handle.abort();
    restore_terminal(&terminal).await?;
    info!("console stopped");

    result
}
