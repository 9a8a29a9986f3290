//! Connection worker lifecycle

use std::sync::Arc;

use assert_matches::assert_matches;
use conduit::backend::connection::{ConnectionConfig, Frame, TransportError};
use conduit::backend::realtime::Hub;
use serde_json::json;

use crate::common::{dispatcher_with, gateway_with, memory_storage, registration, TestClient};
use crate::{assert_frame_err, assert_frame_ok};

#[tokio::test]
async fn test_pipelined_commands_answer_in_order() {
    let hub = Hub::spawn();
    let dispatcher = dispatcher_with(gateway_with(memory_storage()));
    let mut client = TestClient::connect("c1", hub, dispatcher, ConnectionConfig::default());

    client.send_text("registration");
    client.send_text(&registration("alice").to_string());
    client.send_text("getContacts");
    client.send_text("dance");
    client.send_text("logout");

    assert_eq!(client.next_frame().await["responseCode"], "SUCCESS");
    assert_frame_ok!(client.next_frame().await, "contactsResult");
    assert_frame_err!(client.next_frame().await, "unknownCommand", "UNKNOWN_COMMAND");
    assert_frame_ok!(client.next_frame().await, "logoutResult");
}

#[tokio::test]
async fn test_tags_tolerate_trailing_newlines() {
    let hub = Hub::spawn();
    let dispatcher = dispatcher_with(gateway_with(memory_storage()));
    let mut client = TestClient::connect("c1", hub, dispatcher, ConnectionConfig::default());

    client.send_text("getContacts\n");
    assert_frame_err!(client.next_frame().await, "contactsResult", "NOT_AUTHENTICATED");
}

#[tokio::test]
async fn test_disconnect_releases_identity() {
    let hub = Hub::spawn();
    let gateway = gateway_with(memory_storage());
    let bindings = Arc::clone(gateway.bindings());
    let dispatcher = dispatcher_with(gateway);
    let mut client = TestClient::connect("c1", hub.clone(), dispatcher.clone(), ConnectionConfig::default());

    client.command("registration", Some(registration("alice"))).await;
    assert!(bindings.is_bound("c1"));

    client.send_frame(Frame::Close);
    assert_eq!(client.next_raw().await, Some(Frame::Close));
    assert_matches!(client.task.await.unwrap(), Ok(()));
    assert!(bindings.is_empty());
    assert!(!hub.is_registered("c1").await.unwrap());

    // The account survives; a new connection can log in.
    let mut again = TestClient::connect("c2", hub, dispatcher, ConnectionConfig::default());
    let reply = again
        .command("login", Some(json!({ "email": "alice", "password": crate::common::PASSWORD })))
        .await;
    assert_frame_ok!(reply, "loginResult");
}

#[tokio::test]
async fn test_command_cut_off_before_payload() {
    let hub = Hub::spawn();
    let gateway = gateway_with(memory_storage());
    let bindings = Arc::clone(gateway.bindings());
    let mut client = TestClient::connect("c1", hub, dispatcher_with(gateway), ConnectionConfig::default());

    client.send_text("login");
    client.send_frame(Frame::Close);
    assert_eq!(client.next_raw().await, Some(Frame::Close));
    assert_matches!(client.task.await.unwrap(), Ok(()));
    assert!(bindings.is_empty());
}

#[tokio::test]
async fn test_oversized_payload_drops_connection() {
    let hub = Hub::spawn();
    let dispatcher = dispatcher_with(gateway_with(memory_storage()));
    let config = ConnectionConfig {
        max_frame_bytes: 64,
        ..ConnectionConfig::default()
    };
    let client = TestClient::connect("c1", hub.clone(), dispatcher, config);

    client.send_text("uploadMessage");
    client.send_text(&"x".repeat(65));
    assert_matches!(
        client.task.await.unwrap(),
        Err(TransportError::FrameTooLarge { size: 65, max: 64 })
    );
    assert!(!hub.is_registered("c1").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_silent_peer_is_dropped() {
    let hub = Hub::spawn();
    let dispatcher = dispatcher_with(gateway_with(memory_storage()));
    let config = ConnectionConfig::default();
    let pong_wait = config.pong_wait;
    let client = TestClient::connect("c1", hub, dispatcher, config);

    assert_matches!(
        client.task.await.unwrap(),
        Err(TransportError::ReadTimeout(wait)) if wait == pong_wait
    );
}
