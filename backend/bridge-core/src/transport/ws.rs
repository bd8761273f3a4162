//! WebSocket implementation of [`ControlChannel`].
//!
//! The control process exposes a localhost WebSocket endpoint. Frame usage:
//!
//! - **Binary, client → process**: one request envelope
//!   (see [`crate::codec::encode_request`])
//! - **Binary, process → client**: one reply per request, in request order.
//!   The first byte is a presence tag — [`RESPONSE_TAG_ABSENT`] for a reply
//!   with no payload, [`RESPONSE_TAG_PAYLOAD`] followed by the payload bytes
//! - **Text, process → client**: unsolicited push events as JSON
//!   (see [`crate::events::PushEvent`])
//!
//! Replies pair with requests through a FIFO queue of oneshot resolvers, so
//! concurrent callers are allowed but response order is wire order. Push
//! frames never touch the pending queue: the reader task forwards them to
//! the [`EventBridge`] with a non-blocking post, so event delivery and an
//! in-flight call cannot deadlock against each other.
//!
//! When the socket dies the reader drains every pending resolver with
//! [`ChannelError::Closed`] — an in-flight call resolves with a transport
//! error instead of hanging. There is no reconnect here; that belongs to
//! the lifecycle collaborator, which installs a fresh channel.

use crate::error::channel::ChannelError;
use crate::events::{EventBridge, PushEvent};
use crate::transport::{ControlChannel, ReplyFuture};

use common::ErrorLocation;

use std::collections::VecDeque;
use std::fmt::{Debug, Formatter, Result as FormatResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

/// Reply frame tag: the control process answered without a payload.
pub const RESPONSE_TAG_ABSENT: u8 = 0x00;

/// Reply frame tag: payload bytes follow.
pub const RESPONSE_TAG_PAYLOAD: u8 = 0x01;

type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;
type ReplySender = oneshot::Sender<Result<Option<Vec<u8>>, ChannelError>>;
type PendingQueue = Arc<Mutex<VecDeque<ReplySender>>>;

pub struct WsChannel {
    writer: Mutex<WsWriter>,
    pending: PendingQueue,
    closed: Arc<AtomicBool>,
    reader_task: JoinHandle<()>,
}

impl WsChannel {
    /// Connect to the control process and start the background reader.
    ///
    /// Push events arriving on this connection are decoded and handed to
    /// `events`.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Connect`] if the URL does not parse or the
    /// WebSocket handshake fails.
    pub async fn connect(control_url: &str, events: EventBridge) -> Result<Arc<Self>, ChannelError> {
        let url = Url::parse(control_url).map_err(|e| ChannelError::Connect {
            message: format!("invalid control url {control_url}: {e}"),
            location: ErrorLocation::capture(),
        })?;

        let (stream, _response) =
            connect_async(url.as_str())
                .await
                .map_err(|e| ChannelError::Connect {
                    message: format!("handshake with {control_url} failed: {e}"),
                    location: ErrorLocation::capture(),
                })?;

        info!("Control channel connected to {control_url}");

        let (writer, reader) = stream.split();
        let pending: PendingQueue = Arc::new(Mutex::new(VecDeque::new()));
        let closed = Arc::new(AtomicBool::new(false));

        let reader_task = tokio::spawn(read_loop(
            reader,
            Arc::clone(&pending),
            Arc::clone(&closed),
            events,
        ));

        Ok(Arc::new(Self {
            writer: Mutex::new(writer),
            pending,
            closed,
            reader_task,
        }))
    }

    /// Fail every queued caller and refuse further sends.
    async fn tear_down(pending: &PendingQueue, closed: &AtomicBool) {
        closed.store(true, Ordering::SeqCst);
        let mut queue = pending.lock().await;
        while let Some(resolver) = queue.pop_front() {
            let _ = resolver.send(Err(ChannelError::Closed {
                message: "control connection lost before reply".to_string(),
                location: ErrorLocation::capture(),
            }));
        }
    }
}

impl ControlChannel for WsChannel {
    fn send(&self, request: Vec<u8>) -> ReplyFuture<'_> {
        Box::pin(async move {
            if self.closed.load(Ordering::SeqCst) {
                return Err(ChannelError::Closed {
                    message: "control connection already closed".to_string(),
                    location: ErrorLocation::capture(),
                });
            }

            let (resolver, reply) = oneshot::channel();

            // Queue the resolver before the frame hits the wire; otherwise a
            // fast reply could race the reader against an empty queue. The
            // writer lock spans both steps so queue order is wire order.
            {
                let mut writer = self.writer.lock().await;
                self.pending.lock().await.push_back(resolver);

                if let Err(e) = writer.send(Message::Binary(request.into())).await {
                    // A failed write means the connection is gone for every
                    // caller, not just this one.
                    drop(writer);
                    Self::tear_down(&self.pending, &self.closed).await;
                    return Err(ChannelError::Send {
                        message: format!("request write failed: {e}"),
                        location: ErrorLocation::capture(),
                    });
                }
            }

            match reply.await {
                Ok(result) => result,
                Err(_) => Err(ChannelError::Closed {
                    message: "control connection lost before reply".to_string(),
                    location: ErrorLocation::capture(),
                }),
            }
        })
    }
}

impl Debug for WsChannel {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        formatter
            .debug_struct("WsChannel")
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl Drop for WsChannel {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

/// Background frame router: Binary → pending resolver, Text → event bridge.
async fn read_loop(
    mut reader: WsReader,
    pending: PendingQueue,
    closed: Arc<AtomicBool>,
    events: EventBridge,
) {
    while let Some(frame) = reader.next().await {
        match frame {
            Ok(Message::Binary(bytes)) => {
                resolve_reply(&pending, bytes.as_ref()).await;
            }
            Ok(Message::Text(text)) => match serde_json::from_str::<PushEvent>(text.as_str()) {
                Ok(event) => events.dispatch(event).await,
                Err(e) => {
                    warn!("Discarding undecodable push event: {e}");
                }
            },
            Ok(Message::Close(_)) => {
                info!("Control process closed the connection");
                break;
            }
            // Ping/pong and partial frames are handled inside tungstenite.
            Ok(_) => {}
            Err(e) => {
                warn!("Control channel read failed: {e}");
                break;
            }
        }
    }

    WsChannel::tear_down(&pending, &closed).await;
}

/// Hand one reply frame to the oldest waiting caller.
async fn resolve_reply(pending: &PendingQueue, frame: &[u8]) {
    let Some(resolver) = pending.lock().await.pop_front() else {
        warn!("Reply frame with no caller waiting; dropping {} bytes", frame.len());
        return;
    };

    let result = match frame.split_first() {
        Some((&RESPONSE_TAG_ABSENT, _)) => Ok(None),
        Some((&RESPONSE_TAG_PAYLOAD, payload)) => Ok(Some(payload.to_vec())),
        Some((&tag, _)) => Err(ChannelError::Frame {
            message: format!("unknown reply presence tag {tag:#04x}"),
            location: ErrorLocation::capture(),
        }),
        None => Err(ChannelError::Frame {
            message: "reply frame missing presence tag".to_string(),
            location: ErrorLocation::capture(),
        }),
    };

    // The caller may have been dropped; nothing to do then.
    let _ = resolver.send(result);
}
