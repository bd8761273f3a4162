//! Push-event bridge: unsolicited control-process events → UI callbacks.
//!
//! The control process emits two event kinds on its own schedule: proxy
//! delay measurements and log lines. Each kind has exactly one registration
//! slot; registering again replaces the previous listener (last wins, never
//! additive). Delivery hops onto the [`UiContext`] supplied at construction,
//! and events of one kind reach the listener in the order they arrived from
//! the control process. No cross-kind ordering is promised.
//!
//! Dispatch never blocks: the listener reference is snapshotted, the
//! invocation is posted, and the caller (the channel's reader task) moves on.

pub mod ui;

pub use ui::UiContext;

use std::sync::Arc;

use log::warn;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Listener for proxy delay measurements: `(proxy name, delay in ms)`.
pub type DelayUpdateListener = Arc<dyn Fn(String, i64) + Send + Sync>;

/// Listener for control-process log lines. `None` carries a keep-alive
/// marker some cores emit when their log buffer rotates.
pub type LogListener = Arc<dyn Fn(Option<String>) + Send + Sync>;

/// An unsolicited message from the control process, as found on the wire.
///
/// Wire form is JSON tagged by an `event` field:
///
/// ```json
/// {"event": "delayUpdate", "name": "hk-01", "delayMillis": 42}
/// {"event": "log", "message": "dial tcp: connection refused"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum PushEvent {
    #[serde(rename_all = "camelCase")]
    DelayUpdate { name: String, delay_millis: i64 },
    Log { message: Option<String> },
}

/// Two single-slot event sinks plus the context they deliver on.
///
/// Clones share the same slots, so the channel's reader task and the
/// application can hold their own handles.
#[derive(Clone)]
pub struct EventBridge {
    ui: UiContext,
    delay_listener: Arc<RwLock<Option<DelayUpdateListener>>>,
    log_listener: Arc<RwLock<Option<LogListener>>>,
}

impl EventBridge {
    /// Build a bridge delivering onto `ui`. Both slots start empty; events
    /// arriving before a registration are dropped silently.
    #[must_use]
    pub fn new(ui: UiContext) -> Self {
        Self {
            ui,
            delay_listener: Arc::new(RwLock::new(None)),
            log_listener: Arc::new(RwLock::new(None)),
        }
    }

    /// Register the delay-update listener, replacing any previous one.
    pub async fn set_delay_update_listener(
        &self,
        listener: impl Fn(String, i64) + Send + Sync + 'static,
    ) {
        *self.delay_listener.write().await = Some(Arc::new(listener));
    }

    /// Register the log listener, replacing any previous one.
    pub async fn set_log_listener(
        &self,
        listener: impl Fn(Option<String>) + Send + Sync + 'static,
    ) {
        *self.log_listener.write().await = Some(Arc::new(listener));
    }

    /// Route one decoded event to its listener via the UI context.
    ///
    /// The listener reference is snapshotted here, at receipt: an event
    /// already dispatched keeps the listener that was registered when it
    /// arrived, even if a replacement lands before the UI context runs the
    /// callback. Events dispatched after `set_*` returns always see the new
    /// listener.
    ///
    /// Callers that care about per-kind ordering (the channel reader) must
    /// call this sequentially per event source.
    pub async fn dispatch(&self, event: PushEvent) {
        match event {
            PushEvent::DelayUpdate { name, delay_millis } => {
                let Some(listener) = self.delay_listener.read().await.clone() else {
                    return;
                };
                if !self.ui.post(move || listener(name, delay_millis)) {
                    warn!("Delay update dropped: UI context is gone");
                }
            }
            PushEvent::Log { message } => {
                let Some(listener) = self.log_listener.read().await.clone() else {
                    return;
                };
                if !self.ui.post(move || listener(message)) {
                    warn!("Log event dropped: UI context is gone");
                }
            }
        }
    }
}

impl std::fmt::Debug for EventBridge {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("EventBridge")
            .field("ui", &self.ui)
            .finish_non_exhaustive()
    }
}
