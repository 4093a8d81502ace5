//! Activity indicator shown while the engine is busy.
//!
//! Animates a braille frame next to a label; once an operation has taken a
//! while, the elapsed seconds are appended.

use std::time::{Duration, Instant};

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Elapsed time is only shown past this point.
const SHOW_ELAPSED_AFTER: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct Spinner {
    started: Instant,
    label: String,
}

impl Spinner {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            started: Instant::now(),
            label: label.into(),
        }
    }

    /// Spinner for a running query.
    pub fn executing() -> Self {
        Self::new("Executing query...")
    }

    /// Spinner for the connection setup.
    pub fn initializing() -> Self {
        Self::new("Initializing DuckDB")
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Animation frame for the given elapsed time.
    fn frame_at(elapsed: Duration) -> &'static str {
        let index = elapsed.as_millis() / FRAME_INTERVAL.as_millis();
        FRAMES[index as usize % FRAMES.len()]
    }

    pub fn frame(&self) -> &'static str {
        Self::frame_at(self.elapsed())
    }

    fn display_at(&self, elapsed: Duration) -> String {
        let frame = Self::frame_at(elapsed);
        if elapsed >= SHOW_ELAPSED_AFTER {
            format!("{frame} {} ({}s)", self.label, elapsed.as_secs())
        } else {
            format!("{frame} {}", self.label)
        }
    }

    /// Text to render: frame, label and, for long operations, elapsed seconds.
    pub fn display(&self) -> String {
        self.display_at(self.elapsed())
    }
}
