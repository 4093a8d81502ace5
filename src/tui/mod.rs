//! Terminal User Interface for icequery.
//!
//! Provides the main TUI application loop using ratatui and crossterm.

pub mod app;
mod events;
mod ui;
pub mod widgets;

pub use app::{Action, App, Focus};
pub use events::{Event, EventHandler};

use crate::console::Console;
use crate::error::{ConsoleError, Result};
use crate::query::QueryOutcome;
use crossterm::{
    event::{
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::panic;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Messages sent from background tasks to the main loop.
#[derive(Debug)]
pub enum AsyncMessage {
    /// A query execution completed.
    QueryFinished(Result<QueryOutcome>),
}

/// The main TUI application runner.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_handler: EventHandler,
    /// Whether keyboard enhancement flags were pushed and must be popped.
    enhanced_keys: bool,
    /// Cancelled when the loop exits so background tasks stop.
    shutdown: CancellationToken,
}

impl Tui {
    /// Creates a new TUI instance, initializing the terminal.
    pub fn new() -> Result<Self> {
        let (terminal, enhanced_keys) = Self::setup_terminal()?;
        Ok(Self {
            terminal,
            event_handler: EventHandler::new(),
            enhanced_keys,
            shutdown: CancellationToken::new(),
        })
    }

    /// Sets up the terminal for TUI rendering.
    fn setup_terminal() -> Result<(Terminal<CrosstermBackend<Stdout>>, bool)> {
        enable_raw_mode()
            .map_err(|e| ConsoleError::internal(format!("Failed to enable raw mode: {e}")))?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|e| {
            ConsoleError::internal(format!("Failed to enter alternate screen: {e}"))
        })?;

        // Ctrl+Enter is only distinguishable from Enter with the kitty protocol
        let enhanced_keys = supports_keyboard_enhancement().unwrap_or(false)
            && execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
            )
            .is_ok();
        debug!(enhanced_keys, "Terminal ready");

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)
            .map_err(|e| ConsoleError::internal(format!("Failed to create terminal: {e}")))?;

        Ok((terminal, enhanced_keys))
    }

    /// Restores the terminal to its original state.
    fn restore_terminal(&mut self) -> Result<()> {
        if self.enhanced_keys {
            let _ = execute!(self.terminal.backend_mut(), PopKeyboardEnhancementFlags);
            self.enhanced_keys = false;
        }

        disable_raw_mode()
            .map_err(|e| ConsoleError::internal(format!("Failed to disable raw mode: {e}")))?;

        execute!(self.terminal.backend_mut(), LeaveAlternateScreen).map_err(|e| {
            ConsoleError::internal(format!("Failed to leave alternate screen: {e}"))
        })?;

        self.terminal
            .show_cursor()
            .map_err(|e| ConsoleError::internal(format!("Failed to show cursor: {e}")))?;

        Ok(())
    }

    /// Mounts the console and runs the event loop until the user quits.
    pub async fn run(&mut self, console: Console) -> Result<()> {
        // Set up panic hook to restore terminal on panic
        let original_hook = panic::take_hook();
        let shutdown = self.shutdown.clone();
        panic::set_hook(Box::new(move |panic_info| {
            shutdown.cancel();
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags, LeaveAlternateScreen);
            original_hook(panic_info);
        }));

        let manager = Arc::clone(console.manager());
        let mut app_state = App::new(console);

        let init = tokio::spawn({
            let manager = Arc::clone(&manager);
            async move {
                let state = manager.initialize().await;
                debug!(state = state.label(), "Initialization settled");
            }
        });

        // Channel for async messages
        let (tx, mut rx) = mpsc::channel::<AsyncMessage>(8);

        let result = self.run_event_loop(&mut app_state, tx, &mut rx).await;

        // Cleanup: stop background work and release engine resources
        self.shutdown.cancel();
        init.abort();
        manager.shutdown().await;

        // Restore panic hook
        let _ = panic::take_hook();

        result
    }

    /// The main event loop, separated for cleaner error handling.
    async fn run_event_loop(
        &mut self,
        app_state: &mut App,
        tx: mpsc::Sender<AsyncMessage>,
        rx: &mut mpsc::Receiver<AsyncMessage>,
    ) -> Result<()> {
        let mut state_rx = app_state.console.manager().subscribe();
        let mut events = self.event_handler.spawn(self.shutdown.clone());

        loop {
            // Draw the UI
            self.terminal
                .draw(|frame| ui::render(frame, app_state))
                .map_err(|e| ConsoleError::internal(format!("Failed to draw: {e}")))?;

            if !app_state.running || self.shutdown.is_cancelled() {
                break;
            }

            tokio::select! {
                // Handle terminal events
                event = events.recv() => {
                    let event = event
                        .ok_or_else(|| ConsoleError::internal("Event reader stopped"))??;
                    let action = app_state.handle_event(event);
                    self.perform(action, app_state, &tx);
                }

                // Redraw when the connection state changes
                Ok(()) = state_rx.changed() => {
                    let state = state_rx.borrow_and_update().clone();
                    info!(state = state.label(), "Connection state changed");
                }

                // Handle async messages from background tasks
                Some(msg) = rx.recv() => {
                    self.handle_async_message(msg, app_state);
                }
            }
        }

        Ok(())
    }

    /// Carries out an action requested by the application state.
    fn perform(&self, action: Action, app_state: &mut App, tx: &mpsc::Sender<AsyncMessage>) {
        match action {
            Action::None => {}
            Action::Quit => app_state.running = false,
            Action::Run => {
                let Some(sql) = app_state.begin_run() else {
                    return;
                };
                let executor = Arc::clone(app_state.console.executor());
                let tx = tx.clone();
                let shutdown = self.shutdown.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        result = executor.execute(&sql) => {
                            if tx.send(AsyncMessage::QueryFinished(result)).await.is_err() {
                                debug!("Event loop gone before query finished");
                            }
                        }
                        _ = shutdown.cancelled() => {
                            debug!("Query abandoned on shutdown");
                        }
                    }
                });
            }
        }
    }

    /// Handles an async message from a background task.
    fn handle_async_message(&mut self, msg: AsyncMessage, app_state: &mut App) {
        match msg {
            AsyncMessage::QueryFinished(result) => {
                if let Err(e) = &result {
                    warn!("Query could not run: {}", e);
                }
                app_state.finish_run(result);
            }
        }
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

/// Runs the interactive console until the user quits.
pub async fn run(console: Console) -> Result<()> {
    let mut tui = Tui::new()?;
    tui.run(console).await
}
