//! REST clients for the adapter and wallet hub services
//!
//! Everything here is stateless request building: one request in, one
//! decoded response envelope out. Connection state and retries are the
//! caller's concern.

pub mod client;
pub mod types;

pub use client::*;
pub use types::*;
