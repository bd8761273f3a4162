// Unit tests for the bridge state actor.

use crate::state::{BridgeState, StateCommand};
use crate::tests::support::{RecordingChannel, eventually};

use common::ConnectionState;

#[tokio::test]
async fn given_new_state_then_no_channel_and_disconnected() {
    let state = BridgeState::new();

    assert!(state.channel().await.is_none());
    assert_eq!(state.connection_state().await, ConnectionState::Disconnected);
}

/// **VALUE**: Verifies the set → read → clear → read cycle for the channel
/// slot through the command actor.
///
/// **WHY THIS MATTERS**: This is the single-writer replace semantics the
/// lifecycle collaborator relies on across control-process restarts.
///
/// **BUG THIS CATCHES**: Would catch commands being applied out of order or
/// a cleared slot still handing out the dead channel.
#[tokio::test]
async fn given_set_then_clear_channel_when_read_then_slot_tracks_commands() {
    let state = BridgeState::new();

    // WHEN: install
    state
        .update(StateCommand::SetChannel(RecordingChannel::new()))
        .await
        .expect("set channel");

    let probe = state.clone();
    assert!(
        eventually(|| {
            let probe = probe.clone();
            async move { probe.channel().await.is_some() }
        })
        .await,
        "channel never installed"
    );

    // WHEN: clear
    state
        .update(StateCommand::ClearChannel)
        .await
        .expect("clear channel");

    let probe = state.clone();
    assert!(
        eventually(|| {
            let probe = probe.clone();
            async move { probe.channel().await.is_none() }
        })
        .await,
        "channel never cleared"
    );
}

#[tokio::test]
async fn given_connection_transitions_when_sampled_then_latest_wins() {
    let state = BridgeState::new();

    for step in [
        ConnectionState::Connecting,
        ConnectionState::Connected,
        ConnectionState::Disconnecting,
        ConnectionState::Disconnected,
    ] {
        state
            .update(StateCommand::SetConnectionState(step))
            .await
            .expect("set connection state");
    }

    let probe = state.clone();
    assert!(
        eventually(|| {
            let probe = probe.clone();
            async move { probe.connection_state().await == ConnectionState::Disconnected }
        })
        .await,
        "final transition never applied"
    );
}

/// **VALUE**: Verifies clones share one underlying state.
///
/// **WHY THIS MATTERS**: The RPC client, the gate, and the lifecycle
/// collaborator each hold their own clone; a deep copy would mean the
/// client never sees the channel the collaborator installed.
#[tokio::test]
async fn given_cloned_handles_when_one_updates_then_all_observe() {
    let state = BridgeState::new();
    let observer = state.clone();

    state
        .update(StateCommand::SetConnectionState(ConnectionState::Connected))
        .await
        .expect("set connection state");

    assert!(
        eventually(|| {
            let probe = observer.clone();
            async move { probe.connection_state().await == ConnectionState::Connected }
        })
        .await,
        "clone never observed the update"
    );
}
