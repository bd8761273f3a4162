//! Shared bridge state using the actor pattern.
//!
//! Tracks the two facts the bridge samples but never owns:
//! - the current channel handle to the tunnel-control process
//! - the sampled connection state of that process
//!
//! Both are written only by the external lifecycle collaborator, through
//! commands. All mutations funnel through an mpsc channel into a dedicated
//! task, so they are serialized by construction; reads go straight through
//! `Arc<RwLock<…>>` and never wait on a mutation in progress elsewhere.

use crate::error::state::StateError;
use crate::transport::ControlChannel;

use common::{ConnectionState, ErrorLocation};

use std::sync::Arc;

use log::{info, warn};
use tokio::sync::{Mutex, RwLock, mpsc};

/// Commands that mutate bridge state.
///
/// Only the lifecycle collaborator sends these; the RPC and event paths are
/// read-only consumers.
#[derive(Debug, Clone)]
pub enum StateCommand {
    /// Install (or replace) the channel to a freshly started control process.
    SetChannel(Arc<dyn ControlChannel>),

    /// Drop the channel after the control process stopped.
    ClearChannel,

    /// Mirror the control process's connection state machine.
    SetConnectionState(ConnectionState),
}

/// Bridge state manager.
///
/// `Clone` hands out another handle to the same state. The command actor is
/// spawned lazily on the first mutation so the type can be constructed
/// outside an async context.
#[derive(Debug, Clone)]
pub struct BridgeState {
    command_tx: Arc<Mutex<Option<mpsc::Sender<StateCommand>>>>,
    channel: Arc<RwLock<Option<Arc<dyn ControlChannel>>>>,
    connection: Arc<RwLock<ConnectionState>>,
    actor_init: Arc<Mutex<bool>>,
}

impl BridgeState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            command_tx: Arc::new(Mutex::new(None)),
            channel: Arc::new(RwLock::new(None)),
            connection: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            actor_init: Arc::new(Mutex::new(false)),
        }
    }

    /// Send a state mutation command.
    ///
    /// Spawns the actor on first use.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Actor`] if the actor task has died, which does
    /// not happen while any handle is alive.
    pub async fn update(&self, command: StateCommand) -> Result<(), StateError> {
        self.ensure_actor().await;

        let tx_guard = self.command_tx.lock().await;
        let tx = tx_guard.as_ref().ok_or_else(|| StateError::Actor {
            message: "state actor not initialized".to_string(),
            location: ErrorLocation::capture(),
        })?;

        tx.send(command).await.map_err(|e| StateError::Actor {
            message: format!("state actor died: {e}"),
            location: ErrorLocation::capture(),
        })
    }

    /// Current channel handle, if the control process is up.
    pub async fn channel(&self) -> Option<Arc<dyn ControlChannel>> {
        self.channel.read().await.clone()
    }

    /// Last connection state mirrored in by the lifecycle collaborator.
    pub async fn connection_state(&self) -> ConnectionState {
        *self.connection.read().await
    }

    async fn ensure_actor(&self) {
        let mut init_guard = self.actor_init.lock().await;
        if !*init_guard {
            let (tx, rx) = mpsc::channel(100);
            let channel_clone = Arc::clone(&self.channel);
            let connection_clone = Arc::clone(&self.connection);

            // Store tx before spawning so a concurrent update cannot observe
            // an initialized flag without a sender.
            let mut tx_guard = self.command_tx.lock().await;
            *tx_guard = Some(tx);
            drop(tx_guard);

            tokio::spawn(state_actor(rx, channel_clone, connection_clone));
            *init_guard = true;
            info!("Bridge state actor spawned");
        }
    }
}

impl Default for BridgeState {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the mutable state and applies commands one at a time.
async fn state_actor(
    mut command_rx: mpsc::Receiver<StateCommand>,
    channel: Arc<RwLock<Option<Arc<dyn ControlChannel>>>>,
    connection: Arc<RwLock<ConnectionState>>,
) {
    while let Some(command) = command_rx.recv().await {
        match command {
            StateCommand::SetChannel(new_channel) => {
                let mut channel_write = channel.write().await;
                if channel_write.is_some() {
                    warn!("Replacing existing control channel");
                } else {
                    info!("Control channel installed");
                }
                *channel_write = Some(new_channel);
            }
            StateCommand::ClearChannel => {
                let mut channel_write = channel.write().await;
                if channel_write.take().is_some() {
                    info!("Control channel cleared");
                } else {
                    warn!("Clear channel requested but none was set");
                }
            }
            StateCommand::SetConnectionState(new_state) => {
                let mut connection_write = connection.write().await;
                if *connection_write != new_state {
                    info!("Connection state: {} -> {}", *connection_write, new_state);
                }
                *connection_write = new_state;
            }
        }
    }

    warn!("Bridge state actor stopped; no further mutations will apply");
}
