//! Explicit "post to the UI" execution context.
//!
//! Application-visible callbacks must run on the single-threaded context the
//! embedding application designates. There is no implicit main-thread
//! singleton here: whoever builds the [`crate::events::EventBridge`] passes
//! a [`UiContext`] in, and everything posted through one handle runs in FIFO
//! order on one consumer.

use log::info;
use tokio::sync::mpsc;

/// A callback scheduled onto the UI context.
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// Handle to a single-consumer callback executor.
///
/// Cloning the handle shares the same underlying context. Tasks posted from
/// one handle clone run in post order; the channel is unbounded so posting
/// never blocks the poster.
#[derive(Clone)]
pub struct UiContext {
    task_tx: mpsc::UnboundedSender<UiTask>,
}

impl UiContext {
    /// Spawn a dedicated drain task on the current tokio runtime and return
    /// a handle to it.
    ///
    /// Suitable when the embedding application has no event loop of its own
    /// to drain into.
    #[must_use]
    pub fn spawn() -> Self {
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        tokio::spawn(drain_loop(task_rx));
        Self { task_tx }
    }

    /// Wrap a sender whose receiving side the embedding application drains
    /// itself (its real UI loop). The application must execute received
    /// tasks sequentially to keep the FIFO guarantee.
    #[must_use]
    pub fn from_sender(task_tx: mpsc::UnboundedSender<UiTask>) -> Self {
        Self { task_tx }
    }

    /// Schedule a callback. Returns `false` if the context is gone and the
    /// callback was dropped.
    pub fn post(&self, task: impl FnOnce() + Send + 'static) -> bool {
        self.task_tx.send(Box::new(task)).is_ok()
    }
}

impl std::fmt::Debug for UiContext {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("UiContext")
            .field("closed", &self.task_tx.is_closed())
            .finish()
    }
}

/// Runs callbacks one at a time, in arrival order, until every handle is
/// dropped.
async fn drain_loop(mut task_rx: mpsc::UnboundedReceiver<UiTask>) {
    while let Some(task) = task_rx.recv().await {
        task();
    }
    info!("UI context drained and shut down");
}
