//! WebSocket transport over a real listener
//!
//! Serves the full router on a loopback port and talks to `/ws` with a
//! WebSocket client, the way a browser would.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::stream::SplitStream;
use futures_util::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use pulsechat::shared::ServerFrame;

use crate::common::{generate_test_token, test_app, TestApp};
use crate::next_frame;

type WsRead = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Start the router on a random loopback port
async fn serve(app: &TestApp) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn ws_url(addr: SocketAddr, token: &str) -> String {
    format!("ws://{}/ws?token={}", addr, token)
}

/// Next socket message that is not a ping or pong
async fn next_message(read: &mut WsRead) -> Message {
    loop {
        match tokio::time::timeout(Duration::from_secs(2), read.next()).await {
            Ok(Some(Ok(Message::Ping(_) | Message::Pong(_)))) => continue,
            Ok(Some(Ok(msg))) => return msg,
            other => panic!("Expected a message, got {:?}", other),
        }
    }
}

async fn next_server_frame(read: &mut WsRead) -> ServerFrame {
    match next_message(read).await {
        Message::Text(text) => serde_json::from_str(text.as_str()).expect("server frame"),
        other => panic!("Expected a text frame, got {:?}", other),
    }
}

/// Wait until `check` holds, failing after two seconds
async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..100 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("Condition not reached in time");
}

#[tokio::test]
async fn test_query_token_connects_and_routes_messages() {
    let app = test_app().await;
    let alice = app.user().await;
    let bob = app.user().await;
    let (_hb, mut rx_bob) = app.connect(bob).await;
    next_frame!(rx_bob);
    let addr = serve(&app).await;

    let (ws, _) = tokio_tungstenite::connect_async(ws_url(addr, &generate_test_token(alice)))
        .await
        .expect("Failed to connect to WebSocket");
    let (mut write, mut read) = ws.split();

    assert_eq!(
        next_server_frame(&mut read).await,
        ServerFrame::PresenceSnapshot { online: vec![bob] }
    );
    assert!(app.state.gateway.is_online(alice));

    let send = serde_json::json!({ "type": "send_message", "to": bob, "body": "over the wire" });
    write.send(Message::Text(send.to_string().into())).await.unwrap();

    match next_server_frame(&mut read).await {
        ServerFrame::MessageAccepted { message } => assert_eq!(message.body, "over the wire"),
        other => panic!("expected message_accepted, got {:?}", other),
    }
    loop {
        match next_frame!(rx_bob) {
            ServerFrame::NewMessage { message } => {
                assert_eq!(message.sender_id, alice);
                assert_eq!(message.body, "over the wire");
                break;
            }
            ServerFrame::Presence { .. } => continue,
            other => panic!("expected new_message, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_invalid_token_closes_with_4002() {
    let app = test_app().await;
    let addr = serve(&app).await;

    let (ws, _) = tokio_tungstenite::connect_async(ws_url(addr, "invalid_jwt_token"))
        .await
        .expect("WebSocket should upgrade even with invalid token");
    let (_write, mut read) = ws.split();

    match next_message(&mut read).await {
        Message::Close(Some(frame)) => {
            assert_eq!(frame.code, CloseCode::from(4002));
            assert_eq!(frame.reason.as_str(), "Token invalid");
        }
        other => panic!("Expected close frame, got {:?}", other),
    }
    assert_eq!(app.state.gateway.registry().connection_count(), 0);
}

#[tokio::test]
async fn test_client_close_deregisters_connection() {
    let app = test_app().await;
    let alice = app.user().await;
    let addr = serve(&app).await;

    let (ws, _) = tokio_tungstenite::connect_async(ws_url(addr, &generate_test_token(alice)))
        .await
        .unwrap();
    let (mut write, mut read) = ws.split();
    next_server_frame(&mut read).await;
    assert!(app.state.gateway.is_online(alice));

    write.send(Message::Close(None)).await.unwrap();

    let gateway = app.state.gateway.clone();
    eventually(|| !gateway.is_online(alice)).await;
    assert_eq!(gateway.registry().connection_count(), 0);
}

#[tokio::test]
async fn test_evicted_socket_is_closed() {
    let app = test_app().await;
    let alice = app.user().await;
    let addr = serve(&app).await;

    let (ws, _) = tokio_tungstenite::connect_async(ws_url(addr, &generate_test_token(alice)))
        .await
        .unwrap();
    let (mut write, mut read) = ws.split();
    next_server_frame(&mut read).await;

    tokio::time::sleep(Duration::from_millis(5)).await;
    let evicted = app.state.gateway.registry().evict_idle(Duration::ZERO);
    assert_eq!(evicted.len(), 1);
    assert_eq!(evicted[0].0, alice);

    write
        .send(Message::Text(r#"{"type":"ping"}"#.into()))
        .await
        .unwrap();

    match next_message(&mut read).await {
        Message::Close(Some(frame)) => {
            assert_eq!(frame.code, CloseCode::Normal);
            assert_eq!(frame.reason.as_str(), "Connection evicted");
        }
        other => panic!("Expected close frame, got {:?}", other),
    }
    assert!(!app.state.gateway.is_online(alice));
}
