//! Inbound frame decoding and listener fanout

use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::socket::messages::routing_kind;

/// Callback invoked with the full parsed payload of a matching message
pub type Listener = Box<dyn Fn(&Value) + Send + Sync>;

/// Per-connection listener registry with per-kind fanout
///
/// Kinds are an open string space; the broker's event vocabulary is not
/// fixed here. Listeners registered for the same kind run in registration
/// order and are never pruned for the lifetime of the connection.
#[derive(Clone, Default)]
pub struct Dispatcher {
    listeners: Arc<DashMap<String, Vec<Listener>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for an event kind
    pub fn on(&self, kind: impl Into<String>, listener: impl Fn(&Value) + Send + Sync + 'static) {
        self.listeners
            .entry(kind.into())
            .or_default()
            .push(Box::new(listener));
    }

    /// Invoke every listener registered for `kind`, in registration order
    ///
    /// A kind nobody listens to is dropped silently; listener presence is
    /// purely consumer-controlled.
    pub fn emit(&self, kind: &str, payload: &Value) {
        match self.listeners.get(kind) {
            Some(registered) => {
                for listener in registered.iter() {
                    listener(payload);
                }
            }
            None => debug!(kind, "No listeners registered, dropping event"),
        }
    }

    /// Decode an inbound text frame and route it by kind
    ///
    /// Malformed frames are dropped with a warning; they never tear down
    /// the receive loop.
    pub fn dispatch(&self, raw: &str) {
        let payload: Value = match serde_json::from_str(raw) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Dropping malformed broker frame");
                return;
            }
        };

        match routing_kind(&payload) {
            Some(kind) => self.emit(kind, &payload),
            None => debug!("Inbound frame carries no kind, dropping"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<Value>>>, impl Fn(&Value) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |payload: &Value| {
            sink.lock().unwrap().push(payload.clone())
        })
    }

    #[test]
    fn test_dispatch_routes_by_kind() {
        let dispatcher = Dispatcher::new();
        let (seen, listener) = recorder();
        dispatcher.on("mockedKind", listener);

        dispatcher.dispatch(r#"{"kind":"mockedKind","whatever":"whatever"}"#);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], json!({"kind": "mockedKind", "whatever": "whatever"}));
    }

    #[test]
    fn test_dispatch_routes_nested_data_kind() {
        let dispatcher = Dispatcher::new();
        let (seen, listener) = recorder();
        dispatcher.on("mockedKind", listener);

        dispatcher.dispatch(r#"{"data":{"kind":"mockedKind","whatever":"whatever"}}"#);

        // the listener receives the whole frame, data wrapper included
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0],
            json!({"data": {"kind": "mockedKind", "whatever": "whatever"}})
        );
    }

    #[test]
    fn test_listener_order_preserved() {
        let dispatcher = Dispatcher::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            dispatcher.on("mockedKind", move |_| order.lock().unwrap().push(label));
        }

        dispatcher.dispatch(r#"{"kind":"mockedKind"}"#);
        dispatcher.dispatch(r#"{"kind":"mockedKind"}"#);

        assert_eq!(
            *order.lock().unwrap(),
            vec!["first", "second", "third", "first", "second", "third"]
        );
    }

    #[test]
    fn test_multiple_kinds_are_independent() {
        let dispatcher = Dispatcher::new();
        let (transfers, transfer_listener) = recorder();
        let (transactions, transaction_listener) = recorder();
        dispatcher.on("transfer", transfer_listener);
        dispatcher.on("transaction", transaction_listener);

        dispatcher.dispatch(r#"{"kind":"transfer","body":{}}"#);

        assert_eq!(transfers.lock().unwrap().len(), 1);
        assert!(transactions.lock().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_frame_dropped() {
        let dispatcher = Dispatcher::new();
        let (seen, listener) = recorder();
        dispatcher.on("mockedKind", listener);

        dispatcher.dispatch("not json at all");
        dispatcher.dispatch(r#"{"kind":"mockedKind""#);

        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_kind_dropped() {
        let dispatcher = Dispatcher::new();
        // no listeners at all; must not panic
        dispatcher.dispatch(r#"{"kind":"nobodyListens"}"#);
        dispatcher.dispatch(r#"{"whatever":"whatever"}"#);
    }

    #[test]
    fn test_emit_without_decoding() {
        let dispatcher = Dispatcher::new();
        let (seen, listener) = recorder();
        dispatcher.on("opened", listener);

        dispatcher.emit("opened", &Value::Null);

        assert_eq!(*seen.lock().unwrap(), vec![Value::Null]);
    }
}
