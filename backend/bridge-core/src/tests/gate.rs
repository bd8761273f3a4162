// Unit tests for the reachability gate's conjunctive check.

use crate::gate::TransportGate;
use crate::rpc::TunnelClient;
use crate::state::{BridgeState, StateCommand};
use crate::tests::support::{RecordingChannel, eventually};

use common::ConnectionState;

use std::sync::Arc;

async fn gate_with(
    connection: ConnectionState,
    channel: Arc<RecordingChannel>,
) -> (TransportGate, BridgeState) {
    let state = BridgeState::new();
    state
        .update(StateCommand::SetChannel(channel))
        .await
        .expect("set channel");
    state
        .update(StateCommand::SetConnectionState(connection))
        .await
        .expect("set connection state");

    let probe = state.clone();
    assert!(
        eventually(|| {
            let probe = probe.clone();
            async move {
                probe.channel().await.is_some() && probe.connection_state().await == connection
            }
        })
        .await,
        "state never applied"
    );

    let client = TunnelClient::new(state.clone());
    (TransportGate::new(state.clone(), client), state)
}

/// **VALUE**: Verifies the gate short-circuits on a non-Connected state and
/// issues no probe call at all.
///
/// **WHY THIS MATTERS**: When the control process is absent, an IPC call is
/// at best wasted work and at worst a long hang on a dead endpoint. The
/// contract is: not `Connected` means answer `false` immediately.
///
/// **BUG THIS CATCHES**: Would catch a refactor that probes first and
/// checks state second, re-introducing calls into the void.
#[tokio::test]
async fn given_disconnected_state_when_is_reachable_then_false_without_probe() {
    for connection in [
        ConnectionState::Disconnected,
        ConnectionState::Connecting,
        ConnectionState::Disconnecting,
        ConnectionState::Error,
    ] {
        // GIVEN: a channel that would answer true if asked
        let channel = RecordingChannel::new();
        channel.reply_with(Some(vec![1]));
        let (gate, _state) = gate_with(connection, Arc::clone(&channel)).await;

        // WHEN
        let reachable = gate.is_reachable().await;

        // THEN: false, and nothing hit the wire
        assert!(!reachable, "{connection} must read unreachable");
        assert!(
            channel.sent_requests().is_empty(),
            "{connection} must not issue a probe"
        );
    }
}

/// **VALUE**: Verifies the conjunction: a `Connected` flag alone is not
/// trusted; the probe must round-trip and answer true.
#[tokio::test]
async fn given_connected_state_and_true_probe_then_reachable() {
    let channel = RecordingChannel::new();
    channel.reply_with(Some(vec![1]));
    let (gate, _state) = gate_with(ConnectionState::Connected, Arc::clone(&channel)).await;

    assert!(gate.is_reachable().await);
    assert_eq!(channel.sent_requests().len(), 1, "exactly one probe");
}

#[tokio::test]
async fn given_connected_state_and_false_probe_then_unreachable() {
    let channel = RecordingChannel::new();
    channel.reply_with(Some(vec![0]));
    let (gate, _state) = gate_with(ConnectionState::Connected, Arc::clone(&channel)).await;

    assert!(!gate.is_reachable().await);
}

/// **VALUE**: Verifies a probe that dies in transit reads as unreachable
/// rather than surfacing an error or a panic.
///
/// **WHY THIS MATTERS**: A stale `Connected` flag with a dead process
/// underneath is exactly the situation the gate exists to detect.
#[tokio::test]
async fn given_connected_state_and_failing_probe_then_unreachable() {
    let channel = RecordingChannel::new();
    channel.fail_next("broken pipe");
    let (gate, _state) = gate_with(ConnectionState::Connected, Arc::clone(&channel)).await;

    assert!(!gate.is_reachable().await);
}

#[tokio::test]
async fn given_connected_state_and_malformed_probe_reply_then_unreachable() {
    let channel = RecordingChannel::new();
    channel.reply_with(Some(vec![1, 1]));
    let (gate, _state) = gate_with(ConnectionState::Connected, Arc::clone(&channel)).await;

    assert!(!gate.is_reachable().await);
}
