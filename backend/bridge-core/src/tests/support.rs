// Shared unit-test doubles. Integration tests run a real WebSocket control
// server instead; these fakes exist so unit tests can script exact channel
// behavior without sockets.

use crate::error::channel::ChannelError;
use crate::transport::{ControlChannel, ReplyFuture};

use common::ErrorLocation;

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted [`ControlChannel`]: pops one pre-loaded reply per send and
/// records every request payload it was given.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    replies: Mutex<VecDeque<Result<Option<Vec<u8>>, String>>>,
    sent: Mutex<Vec<Vec<u8>>>,
}

impl RecordingChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a successful reply (`None` = control process sent no payload).
    pub fn reply_with(self: &Arc<Self>, reply: Option<Vec<u8>>) {
        self.replies
            .lock()
            .expect("replies lock")
            .push_back(Ok(reply));
    }

    /// Queue a transport failure for the next send.
    pub fn fail_next(self: &Arc<Self>, message: &str) {
        self.replies
            .lock()
            .expect("replies lock")
            .push_back(Err(message.to_string()));
    }

    /// Every request payload sent so far, in order.
    pub fn sent_requests(&self) -> Vec<Vec<u8>> {
        self.sent.lock().expect("sent lock").clone()
    }
}

impl ControlChannel for RecordingChannel {
    fn send(&self, request: Vec<u8>) -> ReplyFuture<'_> {
        Box::pin(async move {
            self.sent.lock().expect("sent lock").push(request);
            match self.replies.lock().expect("replies lock").pop_front() {
                Some(Ok(reply)) => Ok(reply),
                Some(Err(message)) => Err(ChannelError::Send {
                    message,
                    location: ErrorLocation::capture(),
                }),
                // An unscripted send reads as a void reply.
                None => Ok(None),
            }
        })
    }
}

/// Poll `condition` until it holds or ~500ms elapse. State mutations go
/// through the bridge's command actor, so tests must wait for application
/// rather than assume it.
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
