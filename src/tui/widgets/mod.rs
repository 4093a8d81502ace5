//! TUI widgets for icequery.
//!
//! Contains reusable UI components.

pub mod editor;
pub mod header;
pub mod message;
pub mod results;
pub mod spinner;
