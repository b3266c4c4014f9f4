//! Presence notification scenarios

use std::time::Duration;

use pretty_assertions::assert_eq;
use pulsechat::shared::{PresenceState, ServerFrame};
use tokio::sync::mpsc::error::TryRecvError;

use crate::common::test_app;
use crate::next_frame;

/// Give the notifier task time to run
async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

#[tokio::test]
async fn test_online_notified_once_per_transition() {
    let app = test_app().await;
    let alice = app.user().await;
    let bob = app.user().await;
    let (_hb, mut rx_bob) = app.connect(bob).await;
    assert_eq!(
        next_frame!(rx_bob),
        ServerFrame::PresenceSnapshot { online: vec![] }
    );

    let (_h1, _rx1) = app.connect(alice).await;
    assert_eq!(
        next_frame!(rx_bob),
        ServerFrame::Presence {
            user_id: alice,
            state: PresenceState::Online
        }
    );

    let (_h2, _rx2) = app.connect(alice).await;
    settle().await;
    assert_eq!(rx_bob.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn test_offline_notified_after_last_connection() {
    let app = test_app().await;
    let alice = app.user().await;
    let bob = app.user().await;
    let (_hb, mut rx_bob) = app.connect(bob).await;
    next_frame!(rx_bob);

    let (h1, _rx1) = app.connect(alice).await;
    let (h2, _rx2) = app.connect(alice).await;
    next_frame!(rx_bob);

    app.state.gateway.on_disconnect(&h1);
    settle().await;
    assert_eq!(rx_bob.try_recv(), Err(TryRecvError::Empty));

    app.state.gateway.on_disconnect(&h2);
    assert_eq!(
        next_frame!(rx_bob),
        ServerFrame::Presence {
            user_id: alice,
            state: PresenceState::Offline
        }
    );
}

#[tokio::test]
async fn test_snapshot_lists_online_peers() {
    let app = test_app().await;
    let alice = app.user().await;
    let bob = app.user().await;
    let (_hb, _rx_bob) = app.connect(bob).await;

    let (_ha, mut rx_alice) = app.connect(alice).await;

    assert_eq!(
        next_frame!(rx_alice),
        ServerFrame::PresenceSnapshot { online: vec![bob] }
    );
}

#[tokio::test]
async fn test_only_contacts_hear_presence() {
    let app = test_app().await;
    let alice = app.user().await;
    let bob = app.user().await;
    let stranger = app.user().await;
    app.store.add_contact(alice, bob).await;

    let (_hs, mut rx_stranger) = app.connect(stranger).await;
    next_frame!(rx_stranger);

    let (_ha, _rx_alice) = app.connect(alice).await;
    settle().await;

    assert_eq!(rx_stranger.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn test_typing_reaches_recipient_only() {
    let app = test_app().await;
    let alice = app.user().await;
    let bob = app.user().await;
    let (_ha, mut rx_alice) = app.connect(alice).await;
    next_frame!(rx_alice);

    assert_eq!(app.state.gateway.typing(bob, alice, true), 1);
    assert_eq!(
        next_frame!(rx_alice),
        ServerFrame::Typing {
            from: bob,
            is_typing: true
        }
    );
    assert_eq!(app.state.gateway.typing(alice, bob, true), 0);
}
