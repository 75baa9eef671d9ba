//! WebSocket subscription client for broker notifications
//!
//! This module provides:
//! - Socket client owning the connection lifecycle to the broker
//! - Wire message envelope with the closed set of watch/unwatch kinds
//! - Listener registry with per-kind fanout over an open kind space
//! - Connection ready-state tracking shared with the connection task

pub mod client;
pub mod dispatch;
pub mod messages;
pub mod state;

pub use client::*;
pub use dispatch::*;
pub use messages::*;
pub use state::*;
