pub mod api;
pub mod cli;
pub mod config;
pub mod logging;
pub mod socket;
pub mod types;

// Re-export the surface most callers need at the root level
pub use config::ClientConfig;
pub use socket::{BrokerSocket, SocketEventKind};
