//! Socket client for the broker's notification feed

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::socket::dispatch::Dispatcher;
use crate::socket::messages::{
    SocketEventKind, SocketMessage, EVENT_ERROR, EVENT_OPENED,
};
use crate::socket::state::{ReadyState, SharedReadyState};

#[derive(Error, Debug)]
pub enum SocketError {
    #[error("Connection error: {0}")]
    Connection(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Commands accepted by the connection task
#[derive(Debug)]
enum SocketCommand {
    /// Send a raw text frame to the broker
    Transmit(String),
    /// Close the transport
    Shutdown,
}

/// Socket client bound to one broker connection
///
/// Watch and unwatch calls are fire and forget: an empty address list or a
/// connection that is not open turns the call into a silent no-op, and
/// transmit failures are logged instead of surfaced. Transport errors reach
/// the caller only through the `"error"` listener channel.
pub struct BrokerSocket {
    consumer: String,
    command_tx: mpsc::UnboundedSender<SocketCommand>,
    state: SharedReadyState,
    dispatcher: Dispatcher,
}

impl BrokerSocket {
    /// Open a connection to the broker and spawn its connection task
    ///
    /// Returns immediately: the connection reports `Connecting` until the
    /// `"opened"` event fires, and subscription requests issued before that
    /// are dropped. Connect failures after this point are reported through
    /// the `"error"` channel.
    pub async fn connect(url: &str, consumer: &str) -> Result<Self, SocketError> {
        url::Url::parse(url)?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let state = SharedReadyState::new(ReadyState::Connecting);
        let dispatcher = Dispatcher::new();

        let task_url = url.to_string();
        let task_state = state.clone();
        let task_dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            Self::connection_task(task_url, task_state, task_dispatcher, command_rx).await;
        });

        Ok(Self {
            consumer: consumer.to_string(),
            command_tx,
            state,
            dispatcher,
        })
    }

    /// Register a listener for an event kind
    ///
    /// Kinds are an open string space: any kind carried by broker payloads,
    /// plus the local `"opened"` and `"error"` lifecycle events.
    pub fn on(&self, kind: impl Into<String>, listener: impl Fn(&Value) + Send + Sync + 'static) {
        self.dispatcher.on(kind, listener);
    }

    /// Current connection phase
    pub fn ready_state(&self) -> ReadyState {
        self.state.get()
    }

    /// Close the connection; idempotent
    pub fn close(&self) {
        if self.command_tx.send(SocketCommand::Shutdown).is_err() {
            debug!("Connection task already gone, close is a no-op");
        }
    }

    /// Watch transfer notifications for the given addresses
    pub fn watch_transfer(&self, addresses: &[String]) {
        self.send_subscription(SocketEventKind::WatchTransfer, addresses);
    }

    /// Watch transaction notifications for the given addresses
    pub fn watch_transaction(&self, addresses: &[String]) {
        self.send_subscription(SocketEventKind::WatchTransaction, addresses);
    }

    /// Watch transactions of the given contracts, by address or alias
    pub fn watch_contract_transaction(&self, addresses: &[String]) {
        self.send_subscription(SocketEventKind::WatchSmartContractTransaction, addresses);
    }

    /// Watch contract deployments originated by the given addresses
    pub fn watch_contract_deployment(&self, addresses: &[String]) {
        self.send_subscription(SocketEventKind::WatchSmartContractDeployment, addresses);
    }

    /// Watch events emitted by the given contracts, by address or alias
    pub fn watch_contract_event(&self, addresses: &[String]) {
        self.send_subscription(SocketEventKind::WatchSmartContractEvent, addresses);
    }

    /// Stop watching transfers for the given addresses
    pub fn unwatch_transfer(&self, addresses: &[String]) {
        self.send_subscription(SocketEventKind::UnwatchTransfer, addresses);
    }

    /// Stop watching transactions for the given addresses
    pub fn unwatch_transaction(&self, addresses: &[String]) {
        self.send_subscription(SocketEventKind::UnwatchTransaction, addresses);
    }

    /// Stop watching transactions of the given contracts
    pub fn unwatch_contract_transaction(&self, addresses: &[String]) {
        self.send_subscription(SocketEventKind::UnwatchSmartContractTransaction, addresses);
    }

    /// Stop watching contract deployments for the given addresses
    pub fn unwatch_contract_deployment(&self, addresses: &[String]) {
        self.send_subscription(SocketEventKind::UnwatchSmartContractDeployment, addresses);
    }

    /// Stop watching events of the given contracts
    pub fn unwatch_contract_event(&self, addresses: &[String]) {
        self.send_subscription(SocketEventKind::UnwatchSmartContractEvent, addresses);
    }

    /// Shared send path for every watch/unwatch call
    fn send_subscription(&self, kind: SocketEventKind, addresses: &[String]) {
        if addresses.is_empty() {
            debug!(kind = kind.as_str(), "Empty address list, nothing to send");
            return;
        }

        if !self.state.is_open() {
            debug!(
                kind = kind.as_str(),
                state = ?self.state.get(),
                "Connection not open, dropping subscription request"
            );
            return;
        }

        let message = SocketMessage::subscription(kind, addresses, &self.consumer);
        let text = match serde_json::to_string(&message) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, kind = kind.as_str(), "Failed to encode subscription request");
                return;
            }
        };

        debug!(
            kind = kind.as_str(),
            addresses = addresses.len(),
            "Sending subscription request"
        );
        if self.command_tx.send(SocketCommand::Transmit(text)).is_err() {
            warn!(kind = kind.as_str(), "Connection task gone, subscription request lost");
        }
    }

    /// Main connection task: runs the session, then reports how it ended
    async fn connection_task(
        url: String,
        state: SharedReadyState,
        dispatcher: Dispatcher,
        mut command_rx: mpsc::UnboundedReceiver<SocketCommand>,
    ) {
        match Self::connect_and_run(&url, &state, &dispatcher, &mut command_rx).await {
            Ok(()) => info!("Broker connection closed"),
            Err(e) => {
                error!(error = %e, "Broker connection error");
                dispatcher.emit(EVENT_ERROR, &Value::String(e.to_string()));
            }
        }
        state.set(ReadyState::Closed);
    }

    /// Connect and run the WebSocket session
    async fn connect_and_run(
        url: &str,
        state: &SharedReadyState,
        dispatcher: &Dispatcher,
        command_rx: &mut mpsc::UnboundedReceiver<SocketCommand>,
    ) -> Result<(), SocketError> {
        info!(url, "Connecting to broker");

        let (ws_stream, response) = connect_async(url).await?;
        let (mut write, mut read) = ws_stream.split();

        debug!(status = ?response.status(), "Broker connection established");
        state.set(ReadyState::Open);
        dispatcher.emit(EVENT_OPENED, &Value::Null);

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            dispatcher.dispatch(&text);
                        }
                        Some(Ok(Message::Close(_))) => {
                            info!("Broker closed the connection");
                            break;
                        }
                        Some(Err(e)) => {
                            return Err(SocketError::Connection(e));
                        }
                        None => {
                            warn!("Broker stream ended");
                            return Err(SocketError::Connection(
                                tokio_tungstenite::tungstenite::Error::ConnectionClosed,
                            ));
                        }
                        _ => {
                            // binary and ping/pong frames are not part of the protocol
                        }
                    }
                }

                cmd = command_rx.recv() => {
                    match cmd {
                        Some(SocketCommand::Transmit(text)) => {
                            write.send(Message::Text(text.into())).await?;
                        }
                        Some(SocketCommand::Shutdown) => {
                            info!("Close requested");
                            state.set(ReadyState::Closing);
                            write.send(Message::Close(None)).await?;
                            break;
                        }
                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::socket::messages::consumer_kinds;

    fn test_socket(state: ReadyState) -> (BrokerSocket, mpsc::UnboundedReceiver<SocketCommand>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let socket = BrokerSocket {
            consumer: "mockedConsumer".to_string(),
            command_tx,
            state: SharedReadyState::new(state),
            dispatcher: Dispatcher::new(),
        };
        (socket, command_rx)
    }

    fn expect_transmit(command_rx: &mut mpsc::UnboundedReceiver<SocketCommand>) -> Value {
        match command_rx.try_recv() {
            Ok(SocketCommand::Transmit(text)) => serde_json::from_str(&text).unwrap(),
            other => panic!("Expected a transmit command, got {:?}", other),
        }
    }

    #[test]
    fn test_watch_transfer_sends_expected_message() {
        let (socket, mut command_rx) = test_socket(ReadyState::Open);

        socket.watch_transfer(&["0xabc".to_string(), "0xdef".to_string()]);

        let payload = expect_transmit(&mut command_rx);
        assert_eq!(
            payload,
            json!({
                "kind": "watch-transfers",
                "body": ["0xabc", "0xdef"],
                "status": "mined",
                "consumer": "mockedConsumer",
            })
        );
        assert!(command_rx.try_recv().is_err());
    }

    #[test]
    fn test_every_method_maps_to_its_wire_kind() {
        let (socket, mut command_rx) = test_socket(ReadyState::Open);
        let addresses = vec!["0xabc".to_string()];

        socket.watch_transfer(&addresses);
        socket.watch_transaction(&addresses);
        socket.watch_contract_transaction(&addresses);
        socket.watch_contract_deployment(&addresses);
        socket.watch_contract_event(&addresses);
        socket.unwatch_transfer(&addresses);
        socket.unwatch_transaction(&addresses);
        socket.unwatch_contract_transaction(&addresses);
        socket.unwatch_contract_deployment(&addresses);
        socket.unwatch_contract_event(&addresses);

        let expected = [
            "watch-transfers",
            "watch-transactions",
            "watch-contracts-transactions",
            "watch-contracts-deployments",
            "watch-contracts-events",
            "unwatch-transfers",
            "unwatch-transactions",
            "unwatch-contracts-transactions",
            "unwatch-contracts-deployments",
            "unwatch-contracts-events",
        ];
        for kind in expected {
            let payload = expect_transmit(&mut command_rx);
            assert_eq!(payload["kind"], kind);
            assert_eq!(payload["body"], json!(["0xabc"]));
        }
        assert!(command_rx.try_recv().is_err());
    }

    #[test]
    fn test_empty_address_list_is_noop() {
        let (socket, mut command_rx) = test_socket(ReadyState::Open);

        socket.watch_transfer(&[]);
        socket.unwatch_contract_event(&[]);

        assert!(command_rx.try_recv().is_err());
    }

    #[test]
    fn test_not_open_connection_drops_request() {
        let addresses = vec!["0xabc".to_string()];

        for state in [ReadyState::Connecting, ReadyState::Closing, ReadyState::Closed] {
            let (socket, mut command_rx) = test_socket(state);
            socket.watch_transaction(&addresses);
            assert!(command_rx.try_recv().is_err(), "no transmit while {:?}", state);
        }

        // back to open, the same call goes through
        let (socket, mut command_rx) = test_socket(ReadyState::Connecting);
        socket.watch_transaction(&addresses);
        assert!(command_rx.try_recv().is_err());

        socket.state.set(ReadyState::Open);
        socket.watch_transaction(&addresses);
        let payload = expect_transmit(&mut command_rx);
        assert_eq!(payload["kind"], "watch-transactions");
    }

    #[test]
    fn test_close_is_fire_and_forget() {
        let (socket, mut command_rx) = test_socket(ReadyState::Open);

        socket.close();
        assert!(matches!(command_rx.try_recv(), Ok(SocketCommand::Shutdown)));

        // task gone: close stays a silent no-op
        drop(command_rx);
        socket.close();
    }

    #[test]
    fn test_connect_rejects_invalid_url() {
        // no runtime needed: the URL guard fires before anything is spawned
        let result = futures::executor::block_on(BrokerSocket::connect("not a url", "c"));
        assert!(matches!(result, Err(SocketError::UrlParse(_))));
    }

    #[tokio::test]
    async fn test_loopback_watch_and_dispatch() {
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (ready_tx, ready_rx) = tokio::sync::oneshot::channel::<()>();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            // hold the handshake until the client has registered listeners
            ready_rx.await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

            let frame = ws.next().await.unwrap().unwrap().into_text().unwrap();

            // a malformed frame must not kill the receive loop
            ws.send(Message::Text("not json".into())).await.unwrap();
            ws.send(Message::Text(
                r#"{"kind":"transfer","body":{"from":"0xabc"}}"#.into(),
            ))
            .await
            .unwrap();

            frame
        });

        let socket = BrokerSocket::connect(&format!("ws://{}", addr), "mockedConsumer")
            .await
            .unwrap();

        let (opened_tx, mut opened_rx) = mpsc::unbounded_channel();
        socket.on(EVENT_OPENED, move |payload| {
            let _ = opened_tx.send(payload.clone());
        });
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        socket.on(consumer_kinds::TRANSFER, move |payload| {
            let _ = event_tx.send(payload.clone());
        });

        ready_tx.send(()).unwrap();

        // opened fires with no payload once the handshake completes
        assert_eq!(opened_rx.recv().await.unwrap(), Value::Null);
        assert_eq!(socket.ready_state(), ReadyState::Open);

        socket.watch_transfer(&["0xabc".to_string()]);

        let sent: Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        assert_eq!(sent["kind"], "watch-transfers");
        assert_eq!(sent["body"], json!(["0xabc"]));
        assert_eq!(sent["consumer"], "mockedConsumer");
        assert_eq!(sent["status"], "mined");

        let payload = event_rx.recv().await.unwrap();
        assert_eq!(payload, json!({"kind": "transfer", "body": {"from": "0xabc"}}));

        socket.close();
    }

    #[tokio::test]
    async fn test_refused_connection_reports_error_event() {
        // bind and drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let socket = BrokerSocket::connect(&format!("ws://{}", addr), "mockedConsumer")
            .await
            .unwrap();

        let (error_tx, mut error_rx) = mpsc::unbounded_channel();
        socket.on(EVENT_ERROR, move |payload| {
            let _ = error_tx.send(payload.clone());
        });

        let payload = error_rx.recv().await.unwrap();
        assert!(payload.is_string());
        assert_eq!(socket.ready_state(), ReadyState::Closed);
    }
}
