//! Message delivery scenarios

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use pulsechat::backend::messaging::MessageStore;
use pulsechat::backend::realtime::RealtimeError;
use pulsechat::shared::{DeliveryState, ServerFrame};

use crate::common::test_app;
use crate::{assert_ok, next_frame};

fn expect_message(frame: ServerFrame) -> pulsechat::shared::Message {
    match frame {
        ServerFrame::NewMessage { message } => message,
        other => panic!("expected new_message, got {:?}", other),
    }
}

#[tokio::test]
async fn test_every_connection_of_recipient_receives() {
    let app = test_app().await;
    let alice = app.user().await;
    let bob = app.user().await;
    let (_h1, mut rx1) = app.connect(alice).await;
    let (_h2, mut rx2) = app.connect(alice).await;
    next_frame!(rx1);
    next_frame!(rx2);

    let sent = assert_ok!(app.state.gateway.send(bob, alice, "hi").await);

    assert_eq!(sent.delivery_state, DeliveryState::Delivered);
    for rx in [&mut rx1, &mut rx2] {
        let received = expect_message(next_frame!(rx));
        assert_eq!(received.id, sent.id);
        assert_eq!(received.body, "hi");
    }
}

#[tokio::test]
async fn test_offline_recipient_gets_history() {
    let app = test_app().await;
    let alice = app.user().await;
    let carol = app.user().await;
    let t0 = chrono::Utc::now() - chrono::Duration::seconds(1);

    let sent = assert_ok!(app.state.gateway.send(carol, alice, "hello").await);
    assert_eq!(sent.delivery_state, DeliveryState::PersistedUndelivered);

    let history = assert_ok!(app.store.fetch_history(alice, t0).await);
    assert!(history.iter().any(|m| m.body == "hello"));
}

#[tokio::test]
async fn test_disconnected_handle_is_skipped() {
    let app = test_app().await;
    let alice = app.user().await;
    let bob = app.user().await;
    let (h1, mut rx1) = app.connect(alice).await;
    let (h2, mut rx2) = app.connect(alice).await;
    next_frame!(rx1);
    next_frame!(rx2);

    assert_eq!(app.state.gateway.on_disconnect(&h1), Some(alice));
    assert_ok!(app.state.gateway.send(bob, alice, "after").await);

    assert_eq!(expect_message(next_frame!(rx2)).body, "after");
    assert!(rx1.try_recv().is_err());
    let live = app.state.gateway.registry().connections_for(alice);
    assert_eq!(live, vec![h2]);
}

#[tokio::test]
async fn test_dead_handle_evicted_during_send() {
    let app = test_app().await;
    let alice = app.user().await;
    let bob = app.user().await;
    let (h1, rx1) = app.connect(alice).await;
    let (_h2, mut rx2) = app.connect(alice).await;
    next_frame!(rx2);
    drop(rx1);

    let sent = assert_ok!(app.state.gateway.send(bob, alice, "still here").await);

    assert_eq!(sent.delivery_state, DeliveryState::Delivered);
    assert_eq!(expect_message(next_frame!(rx2)).body, "still here");
    assert!(!app.state.gateway.is_registered(h1.id()));
    assert!(app.state.gateway.is_online(alice));
}

#[tokio::test]
async fn test_messages_arrive_in_send_order() {
    let app = test_app().await;
    let alice = app.user().await;
    let bob = app.user().await;
    let (_h, mut rx) = app.connect(alice).await;
    next_frame!(rx);

    for body in ["m1", "m2", "m3"] {
        assert_ok!(app.state.gateway.send(bob, alice, body).await);
    }

    let received: Vec<String> = vec![
        expect_message(next_frame!(rx)).body,
        expect_message(next_frame!(rx)).body,
        expect_message(next_frame!(rx)).body,
    ];
    assert_eq!(received, vec!["m1", "m2", "m3"]);
}

#[tokio::test]
async fn test_backlog_replayed_on_connect() {
    let app = test_app().await;
    let alice = app.user().await;
    let bob = app.user().await;

    let first = assert_ok!(app.state.gateway.send(bob, alice, "while away").await);
    let second = assert_ok!(app.state.gateway.send(bob, alice, "and again").await);

    let (_h, mut rx) = app.connect(alice).await;
    assert_matches!(next_frame!(rx), ServerFrame::PresenceSnapshot { .. });
    assert_eq!(expect_message(next_frame!(rx)).id, first.id);
    assert_eq!(expect_message(next_frame!(rx)).id, second.id);

    let pending = assert_ok!(app.store.undelivered_for(alice).await);
    assert!(pending.is_empty());
    let stored = app.store.all_messages().await;
    assert!(stored
        .iter()
        .all(|m| m.delivery_state == DeliveryState::Delivered));
}

#[tokio::test]
async fn test_pair_order_holds_across_reconnect() {
    let app = test_app().await;
    let alice = app.user().await;
    let bob = app.user().await;
    let gateway = app.state.gateway.clone();

    let (h1, mut rx1) = app.connect(alice).await;
    next_frame!(rx1);
    assert_ok!(gateway.send(bob, alice, "m1").await);
    assert_eq!(expect_message(next_frame!(rx1)).body, "m1");
    gateway.on_disconnect(&h1);

    assert_ok!(gateway.send(bob, alice, "m2").await);
    assert_ok!(gateway.send(bob, alice, "m3").await);

    // Bob keeps sending while Alice reconnects and her backlog replays.
    let sending = async {
        for body in ["m4", "m5", "m6"] {
            assert_ok!(gateway.send(bob, alice, body).await);
            tokio::task::yield_now().await;
        }
    };
    let ((), (_h2, mut rx2)) = tokio::join!(sending, app.connect(alice));

    assert_matches!(next_frame!(rx2), ServerFrame::PresenceSnapshot { .. });
    let mut received = Vec::new();
    for _ in 0..5 {
        received.push(expect_message(next_frame!(rx2)).body);
    }
    assert_eq!(received, vec!["m2", "m3", "m4", "m5", "m6"]);

    assert!(assert_ok!(app.store.undelivered_for(alice).await).is_empty());
    let history: Vec<String> = assert_ok!(app.store.fetch_conversation(alice, bob).await)
        .into_iter()
        .map(|m| m.body)
        .collect();
    assert_eq!(history, vec!["m1", "m2", "m3", "m4", "m5", "m6"]);
}

#[tokio::test]
async fn test_invalid_credential_registers_nothing() {
    let app = test_app().await;
    let (handle, _rx) = app.state.gateway.open_connection();

    let result = app.state.gateway.on_connect(handle.clone(), "garbage").await;

    assert_matches!(result, Err(RealtimeError::InvalidCredential { .. }));
    assert!(!app.state.gateway.is_registered(handle.id()));
    assert_eq!(app.state.gateway.registry().connection_count(), 0);
}
