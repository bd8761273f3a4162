//! Channel abstraction over the control-process IPC primitive.
//!
//! The bridge never owns the connection lifecycle; the external collaborator
//! creates a channel, hands it to [`crate::state::BridgeState`], and replaces
//! or clears it when the process restarts or dies. Everything above this
//! module sees only the [`ControlChannel`] trait.

pub mod ws;

pub use ws::WsChannel;

use crate::error::channel::ChannelError;

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

/// One in-flight reply resolution.
pub type ReplyFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<Vec<u8>>, ChannelError>> + Send + 'a>>;

/// Bidirectional request/response primitive to the tunnel-control process.
///
/// `send` suspends the caller until the matching reply arrives or the
/// connection is torn down; it must never hang past teardown. A reply of
/// `None` means the control process answered without a payload, which is
/// distinct from `Some(vec![])`.
///
/// Implementations also consume the out-of-band push-event stream and hand
/// decoded events to the [`crate::events::EventBridge`]; that path shares
/// the underlying connection but must not block or be blocked by `send`.
pub trait ControlChannel: Send + Sync + Debug {
    fn send(&self, request: Vec<u8>) -> ReplyFuture<'_>;
}
