//! Connection ready-state tracking shared with the connection task

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Connection phase, mirroring the transport's ready state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReadyState {
    Connecting = 0,
    Open = 1,
    Closing = 2,
    Closed = 3,
}

impl ReadyState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => ReadyState::Connecting,
            1 => ReadyState::Open,
            2 => ReadyState::Closing,
            _ => ReadyState::Closed,
        }
    }
}

/// Shared handle to a connection's current ready state
///
/// Reads are advisory: the send path checks this before transmitting, and a
/// state change racing with a send turns the send into the defined silent
/// no-op rather than an error.
#[derive(Debug, Clone)]
pub struct SharedReadyState(Arc<AtomicU8>);

impl SharedReadyState {
    pub fn new(initial: ReadyState) -> Self {
        Self(Arc::new(AtomicU8::new(initial as u8)))
    }

    pub fn get(&self) -> ReadyState {
        ReadyState::from_u8(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, state: ReadyState) {
        self.0.store(state as u8, Ordering::Relaxed);
    }

    pub fn is_open(&self) -> bool {
        self.get() == ReadyState::Open
    }
}
