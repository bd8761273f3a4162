// End-to-end RPC tests over a live WebSocket: typed call in, canned reply
// out, one test per result shape, plus teardown behavior.

use crate::ws_tests::helpers::connect_harness;

use bridge_core::error::rpc::RpcError;
use bridge_core::gate::TransportGate;
use bridge_core::state::StateCommand;

use common::ConnectionState;

use std::time::Duration;

/// **VALUE**: Verifies an Int-shaped call across the real channel: JSON
/// envelope over the socket, tagged little-endian reply decoded back.
///
/// **WHY THIS MATTERS**: This is the wire contract end to end — codec,
/// pending queue, reader task, and decode all have to agree for even one
/// call to work.
#[tokio::test]
async fn given_live_control_server_when_change_proxy_then_status_decoded() {
    let harness = connect_harness().await;

    let status = harness
        .client
        .change_proxy("auto", "hk-01")
        .await
        .expect("change_proxy round trip");

    assert_eq!(status, 0);
}

#[tokio::test]
async fn given_live_control_server_when_get_proxies_then_text_decoded() {
    let harness = connect_harness().await;

    let proxies = harness.client.get_proxies().await.expect("get_proxies");

    assert_eq!(proxies, r#"{"proxies":{"auto":{"now":"hk-01"}}}"#);
}

#[tokio::test]
async fn given_live_control_server_when_close_connection_then_bool_decoded() {
    let harness = connect_harness().await;

    assert!(
        harness
            .client
            .close_connection("conn-1")
            .await
            .expect("close_connection")
    );
}

#[tokio::test]
async fn given_live_control_server_when_close_all_connections_then_void_ok() {
    let harness = connect_harness().await;

    harness
        .client
        .close_all_connections()
        .await
        .expect("void call with absent-tagged reply");
}

/// **VALUE**: Verifies sequential calls pair with their own replies.
///
/// **WHY THIS MATTERS**: Replies carry no correlation id; pairing is wire
/// order through the pending queue. Two calls with different shapes would
/// decode each other's payloads if the queue slipped.
#[tokio::test]
async fn given_mixed_shape_calls_when_issued_sequentially_then_each_decodes() {
    let harness = connect_harness().await;

    assert!(harness.client.is_alive().await.expect("is_alive"));
    assert_eq!(
        harness.client.get_traffic().await.expect("get_traffic"),
        r#"{"up":1024,"down":4096}"#
    );
    assert_eq!(
        harness.client.core_init("/var/lib/tunnel").await.expect("core_init"),
        0
    );
    harness.client.start_log().await.expect("start_log");
}

/// **VALUE**: Verifies an in-flight call resolves with `Transport` when the
/// control process drops the connection before answering.
///
/// **WHY THIS MATTERS**: The no-hang guarantee. Without pending-queue
/// draining on teardown, the suspended caller would wait forever and take
/// its UI task with it.
///
/// **BUG THIS CATCHES**: Would catch the reader task exiting without
/// failing queued resolvers.
#[tokio::test]
async fn given_in_flight_call_when_server_closes_then_transport_failure() {
    let mut harness = connect_harness().await;

    // GIVEN: a call parked on the stall method
    let client = harness.client.clone();
    let in_flight = tokio::spawn(async move { client.get_tun_mode().await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    // WHEN: the control process drops the connection
    harness.server.close();

    // THEN: the parked call resolves with Transport, not a hang
    let result = tokio::time::timeout(Duration::from_secs(5), in_flight)
        .await
        .expect("call must resolve after teardown")
        .expect("task join");
    assert!(matches!(result, Err(RpcError::Transport { .. })));
}

#[tokio::test]
async fn given_closed_connection_when_next_call_then_transport_failure_fast() {
    let mut harness = connect_harness().await;

    harness.server.close();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // The channel is still installed in state, but it is dead.
    let result = harness.client.get_config().await;
    assert!(matches!(result, Err(RpcError::Transport { .. })));
}

/// **VALUE**: Verifies the gate end to end: Connected + live probe is
/// reachable; anything less is not.
#[tokio::test]
async fn given_connected_state_and_live_server_when_is_reachable_then_true() {
    let harness = connect_harness().await;
    harness
        .state
        .update(StateCommand::SetConnectionState(ConnectionState::Connected))
        .await
        .expect("set connected");

    let probe = harness.state.clone();
    assert!(
        crate::ws_tests::helpers::eventually(|| {
            let probe = probe.clone();
            async move { probe.connection_state().await == ConnectionState::Connected }
        })
        .await
    );

    let gate = TransportGate::new(harness.state.clone(), harness.client.clone());
    assert!(gate.is_reachable().await);
}

#[tokio::test]
async fn given_default_disconnected_state_when_is_reachable_then_false() {
    let harness = connect_harness().await;

    let gate = TransportGate::new(harness.state.clone(), harness.client.clone());
    assert!(!gate.is_reachable().await);
}
