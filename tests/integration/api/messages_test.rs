//! Messaging API tests

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use pretty_assertions::assert_eq;
use pulsechat::shared::{DeliveryState, ServerFrame, UserId};
use serde_json::json;

use crate::common::{auth_header, generate_test_token, session_cookie_header, test_app};
use crate::next_frame;

fn send_request(recipient: UserId, token: &str, text: &str) -> Request<Body> {
    Request::post(format!("/api/messages/send/{}", recipient))
        .header(header::AUTHORIZATION, auth_header(token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "text": text }).to_string()))
        .unwrap()
}

fn get_request(uri: &str, token: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::AUTHORIZATION, auth_header(token))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_send_without_token() {
    let app = test_app().await;
    let recipient = app.user().await;

    let (status, body) = app
        .request_json(
            Request::post(format!("/api/messages/send/{}", recipient))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "text": "hi" }).to_string()))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized - No Token Provided");
    assert!(app.store.all_messages().await.is_empty());
}

#[tokio::test]
async fn test_send_to_offline_user_persists() {
    let app = test_app().await;
    let sender = app.user().await;
    let recipient = app.user().await;
    let token = generate_test_token(sender);

    let (status, body) = app.request_json(send_request(recipient, &token, "hello")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["body"], "hello");
    assert_eq!(body["sender_id"], sender.to_string());
    assert_eq!(body["delivery_state"], "persisted_undelivered");

    let stored = app.store.all_messages().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].delivery_state, DeliveryState::PersistedUndelivered);
}

#[tokio::test]
async fn test_send_to_online_user_pushes_frame() {
    let app = test_app().await;
    let sender = app.user().await;
    let recipient = app.user().await;
    let (_handle, mut rx) = app.connect(recipient).await;
    assert!(matches!(next_frame!(rx), ServerFrame::PresenceSnapshot { .. }));

    let token = generate_test_token(sender);
    let (status, body) = app.request_json(send_request(recipient, &token, "live")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["delivery_state"], "delivered");
    match next_frame!(rx) {
        ServerFrame::NewMessage { message } => {
            assert_eq!(message.body, "live");
            assert_eq!(message.sender_id, sender);
        }
        other => panic!("unexpected frame {:?}", other),
    }
}

#[tokio::test]
async fn test_send_with_cookie() {
    let app = test_app().await;
    let sender = app.user().await;
    let recipient = app.user().await;
    let token = generate_test_token(sender);

    let (status, _) = app
        .request_json(
            Request::post(format!("/api/messages/send/{}", recipient))
                .header(header::COOKIE, session_cookie_header(&token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "text": "via cookie" }).to_string()))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_send_to_unknown_user() {
    let app = test_app().await;
    let sender = app.user().await;
    let token = generate_test_token(sender);

    let (status, body) = app
        .request_json(send_request(UserId::new(), &token, "anyone?"))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
    assert!(app.store.all_messages().await.is_empty());
}

#[tokio::test]
async fn test_send_empty_text() {
    let app = test_app().await;
    let sender = app.user().await;
    let recipient = app.user().await;
    let token = generate_test_token(sender);

    let (status, body) = app.request_json(send_request(recipient, &token, "   ")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Message cannot be empty");
}

#[tokio::test]
async fn test_conversation_and_history() {
    let app = test_app().await;
    let alice = app.user().await;
    let bob = app.user().await;
    let carol = app.user().await;
    let alice_token = generate_test_token(alice);
    let bob_token = generate_test_token(bob);

    app.request_json(send_request(bob, &alice_token, "one")).await;
    app.request_json(send_request(alice, &bob_token, "two")).await;
    app.request_json(send_request(carol, &alice_token, "elsewhere")).await;

    let (status, body) = app
        .request_json(get_request(&format!("/api/messages/{}", bob), &alice_token))
        .await;
    assert_eq!(status, StatusCode::OK);
    let bodies: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["body"].as_str().unwrap())
        .collect();
    assert_eq!(bodies, vec!["one", "two"]);

    let (status, body) = app
        .request_json(get_request("/api/messages/history", &alice_token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (_, body) = app
        .request_json(get_request("/api/messages/history", &bob_token))
        .await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_sidebar_without_database() {
    let app = test_app().await;
    let token = generate_test_token(app.user().await);

    let (status, _) = app
        .request_json(get_request("/api/messages/users", &token))
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
