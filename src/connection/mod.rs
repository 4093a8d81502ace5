//! Connection management for icequery.
//!
//! Owns the one-shot lifecycle that brings the engine online with the remote
//! catalog attached.

pub mod manager;
pub mod statements;

pub use manager::{ConnectionInfo, ConnectionLease, ConnectionManager, ConnectionState};
