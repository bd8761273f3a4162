// End-to-end push-event tests: control server emits Text frames, the
// channel's reader routes them through the event bridge onto the UI
// context, listeners observe them in order.

use crate::ws_tests::helpers::{connect_harness, recv_within};

use bridge_core::events::PushEvent;

use tokio::sync::mpsc;

/// **VALUE**: Verifies log events cross the real socket in emission order.
///
/// **WHY THIS MATTERS**: Ordering is promised per kind from the control
/// process all the way to the listener; socket framing, the reader task,
/// and the UI context each have to preserve it.
#[tokio::test]
async fn given_pushed_log_events_when_delivered_then_in_emission_order() {
    // GIVEN: a log listener forwarding deliveries to the test
    let harness = connect_harness().await;
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    harness
        .events
        .set_log_listener(move |message| {
            seen_tx.send(message).expect("forward");
        })
        .await;

    // WHEN: the control process emits three log lines
    for message in ["a", "b", "c"] {
        harness.server.push(PushEvent::Log {
            message: Some(message.to_string()),
        });
    }

    // THEN: delivered in the same order
    assert_eq!(recv_within(&mut seen_rx).await, Some("a".to_string()));
    assert_eq!(recv_within(&mut seen_rx).await, Some("b".to_string()));
    assert_eq!(recv_within(&mut seen_rx).await, Some("c".to_string()));
}

#[tokio::test]
async fn given_pushed_delay_update_when_delivered_then_fields_intact() {
    let harness = connect_harness().await;
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    harness
        .events
        .set_delay_update_listener(move |name, delay| {
            seen_tx.send((name, delay)).expect("forward");
        })
        .await;

    harness.server.push(PushEvent::DelayUpdate {
        name: "hk-01".to_string(),
        delay_millis: 87,
    });

    assert_eq!(recv_within(&mut seen_rx).await, ("hk-01".to_string(), 87));
}

/// **VALUE**: Verifies sink replacement over a live connection: events
/// emitted after S2 registers reach only S2.
#[tokio::test]
async fn given_replaced_listener_when_event_pushed_then_only_new_receives() {
    let harness = connect_harness().await;

    let (first_tx, mut first_rx) = mpsc::unbounded_channel();
    harness
        .events
        .set_delay_update_listener(move |name, delay| {
            first_tx.send((name, delay)).expect("forward to first");
        })
        .await;

    let (second_tx, mut second_rx) = mpsc::unbounded_channel();
    harness
        .events
        .set_delay_update_listener(move |name, delay| {
            second_tx.send((name, delay)).expect("forward to second");
        })
        .await;

    harness.server.push(PushEvent::DelayUpdate {
        name: "jp-03".to_string(),
        delay_millis: 140,
    });

    assert_eq!(recv_within(&mut second_rx).await, ("jp-03".to_string(), 140));
    assert!(
        first_rx.try_recv().is_err(),
        "replaced listener must not be invoked"
    );
}

/// **VALUE**: Verifies push events and an in-flight RPC coexist on one
/// socket: a parked call does not stop event delivery.
///
/// **WHY THIS MATTERS**: The two paths share the connection; this scenario
/// is exactly where a naive implementation deadlocks or starves one side.
///
/// **BUG THIS CATCHES**: Would catch the reader blocking on the pending
/// queue (or the dispatch path) while a request waits, starving events.
#[tokio::test]
async fn given_in_flight_call_when_events_pushed_then_still_delivered() {
    let harness = connect_harness().await;
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    harness
        .events
        .set_log_listener(move |message| {
            seen_tx.send(message).expect("forward");
        })
        .await;

    // GIVEN: a call the server will never answer
    let client = harness.client.clone();
    let in_flight = tokio::spawn(async move { client.get_tun_mode().await });

    // WHEN: an event arrives while that call is parked
    harness.server.push(PushEvent::Log {
        message: Some("still flowing".to_string()),
    });

    // THEN: the event is delivered regardless
    assert_eq!(
        recv_within(&mut seen_rx).await,
        Some("still flowing".to_string())
    );

    in_flight.abort();
}
