//! Test helpers for the WebSocket control-channel integration tests.
//!
//! `start_control_server` runs a single-connection fake tunnel-control
//! process: it decodes request envelopes, answers each method with a canned
//! reply in arrival order, and emits push events on demand. Tests drive the
//! real `WsChannel`/`TunnelClient` stack against it.

use bridge_core::events::{EventBridge, PushEvent, UiContext};
use bridge_core::rpc::TunnelClient;
use bridge_core::state::{BridgeState, StateCommand};
use bridge_core::transport::WsChannel;
use bridge_core::transport::ws::{RESPONSE_TAG_ABSENT, RESPONSE_TAG_PAYLOAD};

use std::future::Future;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Requests for this method are read but never answered; tests use it to
/// park a call in flight before injecting a failure.
pub const STALL_METHOD: &str = "getTunMode";

/// Running fake control process.
pub struct ControlServer {
    pub url: String,
    push_tx: mpsc::UnboundedSender<PushEvent>,
    close_tx: Option<oneshot::Sender<()>>,
}

impl ControlServer {
    /// Emit one push event toward the connected client.
    pub fn push(&self, event: PushEvent) {
        self.push_tx.send(event).expect("control server gone");
    }

    /// Drop the connection, abandoning any unanswered request.
    pub fn close(&mut self) {
        if let Some(close_tx) = self.close_tx.take() {
            let _ = close_tx.send(());
        }
    }
}

/// Bind an ephemeral port and serve exactly one client connection.
pub async fn start_control_server() -> ControlServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind control server");
    let address = listener.local_addr().expect("control server address");

    let (push_tx, push_rx) = mpsc::unbounded_channel();
    let (close_tx, close_rx) = oneshot::channel();

    tokio::spawn(serve_one_client(listener, push_rx, close_rx));

    ControlServer {
        url: format!("ws://{address}"),
        push_tx,
        close_tx: Some(close_tx),
    }
}

async fn serve_one_client(
    listener: TcpListener,
    mut push_rx: mpsc::UnboundedReceiver<PushEvent>,
    mut close_rx: oneshot::Receiver<()>,
) {
    let Ok((stream, _)) = listener.accept().await else {
        return;
    };
    let websocket = accept_async(stream).await.expect("control handshake");
    let (mut write, mut read) = websocket.split();

    loop {
        tokio::select! {
            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Binary(bytes))) => {
                        let envelope: Value =
                            serde_json::from_slice(bytes.as_ref()).expect("request envelope");
                        let method = envelope["method"].as_str().expect("method name");
                        if method == STALL_METHOD {
                            continue;
                        }
                        let reply = canned_reply(method);
                        write
                            .send(Message::Binary(reply.into()))
                            .await
                            .expect("send reply");
                    }
                    Some(Ok(_)) => {}
                    _ => break,
                }
            }
            event = push_rx.recv() => {
                let Some(event) = event else { break };
                let json = serde_json::to_string(&event).expect("encode push event");
                write.send(Message::text(json)).await.expect("send push event");
            }
            _ = &mut close_rx => break,
        }
    }
}

/// Fixed reply per method: presence tag plus payload, mirroring the shape
/// the real control process would use.
fn canned_reply(method: &str) -> Vec<u8> {
    match method {
        "isAlive" | "closeConnection" | "parseOptions" => tagged(Some(&[1])),
        "changeProxy" | "coreInit" | "isConfigValid" | "setConfig" | "setHomeDir" => {
            tagged(Some(&0_i64.to_le_bytes()))
        }
        "getProxies" => tagged(Some(br#"{"proxies":{"auto":{"now":"hk-01"}}}"#)),
        "getTraffic" => tagged(Some(br#"{"up":1024,"down":4096}"#)),
        "getAllConnections" | "getConfig" | "getConfigs" | "getProviders" => {
            tagged(Some(b"{}"))
        }
        // Void methods and anything unknown answer with no payload.
        _ => tagged(None),
    }
}

fn tagged(payload: Option<&[u8]>) -> Vec<u8> {
    match payload {
        None => vec![RESPONSE_TAG_ABSENT],
        Some(bytes) => {
            let mut frame = Vec::with_capacity(1 + bytes.len());
            frame.push(RESPONSE_TAG_PAYLOAD);
            frame.extend_from_slice(bytes);
            frame
        }
    }
}

/// The connected full stack a test drives.
pub struct Harness {
    pub server: ControlServer,
    pub state: BridgeState,
    pub client: TunnelClient,
    pub events: EventBridge,
}

/// Start a control server, connect a `WsChannel` to it, and install the
/// channel into fresh bridge state.
pub async fn connect_harness() -> Harness {
    let server = start_control_server().await;
    let events = EventBridge::new(UiContext::spawn());
    let channel = WsChannel::connect(&server.url, events.clone())
        .await
        .expect("connect to control server");

    let state = BridgeState::new();
    state
        .update(StateCommand::SetChannel(channel))
        .await
        .expect("install channel");

    let probe = state.clone();
    assert!(
        eventually(|| {
            let probe = probe.clone();
            async move { probe.channel().await.is_some() }
        })
        .await,
        "channel never installed"
    );

    let client = TunnelClient::new(state.clone());
    Harness {
        server,
        state,
        client,
        events,
    }
}

/// Poll `condition` until it holds or ~500ms elapse.
pub async fn eventually<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..100 {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}

/// Receive with a hard deadline so a lost event fails the test instead of
/// hanging it.
pub async fn recv_within<T>(receiver: &mut mpsc::UnboundedReceiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), receiver.recv())
        .await
        .expect("timed out waiting for delivery")
        .expect("delivery channel closed")
}
