//! Reachability check for the tunnel-control process.
//!
//! A `Connected` flag alone can be stale — the process may have wedged
//! without the lifecycle collaborator noticing — so reachability is
//! conjunctive: the sampled state must be `Connected` *and* a live probe
//! must round-trip. The state check comes first specifically so no IPC
//! traffic is issued toward a process that is known to be absent.

use crate::rpc::TunnelClient;
use crate::state::BridgeState;

#[derive(Debug, Clone)]
pub struct TransportGate {
    state: BridgeState,
    client: TunnelClient,
}

impl TransportGate {
    #[must_use]
    pub fn new(state: BridgeState, client: TunnelClient) -> Self {
        Self { state, client }
    }

    /// True only when the sampled connection state is `Connected` and the
    /// `isAlive` probe both completes and answers `true`.
    ///
    /// Any probe failure — `NotConnected`, `Transport`,
    /// `MalformedResponse` — reads as unreachable; the error itself is not
    /// surfaced because callers of a gate want a yes/no, not a diagnosis.
    pub async fn is_reachable(&self) -> bool {
        if !self.state.connection_state().await.is_connected() {
            return false;
        }

        self.client.is_alive().await.unwrap_or(false)
    }
}
