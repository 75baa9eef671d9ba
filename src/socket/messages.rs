//! Wire messages exchanged with the broker service

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Local event fired when the transport finishes its open handshake.
/// Never appears on the wire.
pub const EVENT_OPENED: &str = "opened";

/// Local event carrying transport errors. Never appears on the wire.
pub const EVENT_ERROR: &str = "error";

/// Event kinds the broker is known to push. The routing space stays open;
/// these are just the names agreed with the broker out of band.
pub mod consumer_kinds {
    pub const TRANSFER: &str = "transfer";
    pub const TRANSACTION: &str = "transaction";
    pub const CONTRACT_TRANSACTION: &str = "contract-transaction";
    pub const CONTRACT_DEPLOYMENT: &str = "contract-deployment";
    pub const CONTRACT_EVENT: &str = "contract-event";
    pub const ERROR: &str = "error";
}

/// Outbound subscription kinds understood by the broker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocketEventKind {
    #[serde(rename = "watch-transfers")]
    WatchTransfer,
    #[serde(rename = "watch-transactions")]
    WatchTransaction,
    #[serde(rename = "watch-contracts-transactions")]
    WatchSmartContractTransaction,
    #[serde(rename = "watch-contracts-deployments")]
    WatchSmartContractDeployment,
    #[serde(rename = "watch-contracts-events")]
    WatchSmartContractEvent,
    #[serde(rename = "unwatch-transfers")]
    UnwatchTransfer,
    #[serde(rename = "unwatch-transactions")]
    UnwatchTransaction,
    #[serde(rename = "unwatch-contracts-transactions")]
    UnwatchSmartContractTransaction,
    #[serde(rename = "unwatch-contracts-deployments")]
    UnwatchSmartContractDeployment,
    #[serde(rename = "unwatch-contracts-events")]
    UnwatchSmartContractEvent,
}

impl SocketEventKind {
    /// Wire value for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            SocketEventKind::WatchTransfer => "watch-transfers",
            SocketEventKind::WatchTransaction => "watch-transactions",
            SocketEventKind::WatchSmartContractTransaction => "watch-contracts-transactions",
            SocketEventKind::WatchSmartContractDeployment => "watch-contracts-deployments",
            SocketEventKind::WatchSmartContractEvent => "watch-contracts-events",
            SocketEventKind::UnwatchTransfer => "unwatch-transfers",
            SocketEventKind::UnwatchTransaction => "unwatch-transactions",
            SocketEventKind::UnwatchSmartContractTransaction => "unwatch-contracts-transactions",
            SocketEventKind::UnwatchSmartContractDeployment => "unwatch-contracts-deployments",
            SocketEventKind::UnwatchSmartContractEvent => "unwatch-contracts-events",
        }
    }
}

/// Confirmation level requested for watched notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocketStatus {
    Pending,
    Mined,
}

/// JSON envelope for subscription requests sent to the broker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketMessage {
    pub kind: SocketEventKind,
    pub body: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SocketStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer: Option<String>,
}

impl SocketMessage {
    /// Build a watch/unwatch request for a list of addresses or aliases
    pub fn subscription(kind: SocketEventKind, addresses: &[String], consumer: &str) -> Self {
        Self {
            kind,
            body: Value::Array(
                addresses
                    .iter()
                    .map(|address| Value::String(address.clone()))
                    .collect(),
            ),
            status: Some(SocketStatus::Mined),
            consumer: Some(consumer.to_string()),
        }
    }
}

/// Routing key of an inbound frame: the top-level `kind` field, or the
/// nested `data.kind` field for broker-relayed payloads
pub fn routing_kind(payload: &Value) -> Option<&str> {
    payload
        .get("kind")
        .and_then(Value::as_str)
        .or_else(|| {
            payload
                .get("data")
                .and_then(|data| data.get("kind"))
                .and_then(Value::as_str)
        })
}
