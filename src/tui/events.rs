//! Event handling for the TUI.
//!
//! Translates crossterm events into console events. A single reader thread
//! owns the terminal input and forwards events over a channel.

use crate::error::{ConsoleError, Result};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Events the reader may queue ahead of the event loop.
const EVENT_BUFFER: usize = 32;

/// Application events.
#[derive(Debug)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// The terminal was resized.
    Resize(u16, u16),
    /// A periodic tick, used to animate spinners.
    Tick,
}

impl Event {
    /// Maps a raw crossterm event. Key releases are reported as ticks.
    pub fn from_crossterm(event: CrosstermEvent) -> Self {
        match event {
            CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => Self::Key(key),
            CrosstermEvent::Resize(width, height) => Self::Resize(width, height),
            _ => Self::Tick,
        }
    }
}

/// Polls terminal events with a fixed tick rate.
#[derive(Debug, Clone, Copy)]
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    /// Creates a new event handler with default tick rate.
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(100),
        }
    }

    pub fn with_tick_rate(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Blocks for at most one tick waiting for the next event.
    ///
    /// Returns [`Event::Tick`] when nothing arrived in time.
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)
            .map_err(|e| ConsoleError::internal(format!("Failed to poll events: {e}")))?
        {
            let event = event::read()
                .map_err(|e| ConsoleError::internal(format!("Failed to read event: {e}")))?;
            Ok(Event::from_crossterm(event))
        } else {
            Ok(Event::Tick)
        }
    }

    /// Starts the reader thread and returns the receiving end of its channel.
    ///
    /// The reader runs until `shutdown` is cancelled, the receiver is
    /// dropped or reading fails. Every event read is delivered in order.
    pub fn spawn(self, shutdown: CancellationToken) -> mpsc::Receiver<Result<Event>> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        tokio::task::spawn_blocking(move || forward(|| self.next(), &tx, &shutdown));
        rx
    }
}

/// Sends events from `next` into `tx`, stopping after the first error.
fn forward(
    mut next: impl FnMut() -> Result<Event>,
    tx: &mpsc::Sender<Result<Event>>,
    shutdown: &CancellationToken,
) {
    while !shutdown.is_cancelled() {
        let event = next();
        let failed = event.is_err();
        if tx.blocking_send(event).is_err() || failed {
            break;
        }
    }
    debug!("Event reader stopped");
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
