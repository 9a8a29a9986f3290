//! Direct messaging over live connections

use conduit::backend::connection::ConnectionConfig;
use conduit::backend::realtime::Hub;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{dispatcher_with, gateway_with, memory_storage, registration, TestClient};
use crate::{assert_frame_err, assert_frame_ok};

async fn two_clients() -> (TestClient, TestClient) {
    let hub = Hub::spawn();
    let dispatcher = dispatcher_with(gateway_with(memory_storage()));

    let mut alice = TestClient::connect("c-alice", hub.clone(), dispatcher.clone(), ConnectionConfig::default());
    let mut bob = TestClient::connect("c-bob", hub, dispatcher, ConnectionConfig::default());

    let reply = alice.command("registration", Some(registration("alice"))).await;
    assert_eq!(reply["responseCode"], "SUCCESS");
    let reply = bob.command("registration", Some(registration("bob"))).await;
    assert_eq!(reply["responseCode"], "SUCCESS");

    (alice, bob)
}

#[tokio::test]
async fn test_alice_sends_bob_hi() {
    let (mut alice, mut bob) = two_clients().await;

    let reply = alice
        .command("uploadMessage", Some(json!({ "receiver": "bob", "message": "hi" })))
        .await;
    assert_frame_ok!(reply, "messageUpload");

    let reply = bob
        .command("getMessages", Some(json!({ "counterpart": "alice", "since": 0 })))
        .await;
    assert_frame_ok!(reply, "messagesResult");
    let messages = reply["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["contents"], "hi");
    assert_eq!(messages[0]["sentByViewer"], false);
    assert!(messages[0]["readAt"].as_i64().unwrap() > 0);
    assert_eq!(reply["nextSince"], messages[0]["timestamp"]);

    let reply = alice
        .command("getMessages", Some(json!({ "counterpart": "bob", "since": 0 })))
        .await;
    assert_eq!(reply["messages"][0]["sentByViewer"], true);

    let reply = bob.command("getContacts", None).await;
    assert_frame_ok!(reply, "contactsResult");
    assert_eq!(reply["contacts"][0]["username"], "alice");
}

#[tokio::test]
async fn test_messages_page_with_cursor() {
    let (mut alice, mut bob) = two_clients().await;

    for i in 0..12 {
        let reply = alice
            .command("uploadMessage", Some(json!({ "receiver": "bob", "message": format!("m{}", i) })))
            .await;
        assert_frame_ok!(reply, "messageUpload");
    }

    let first = bob
        .command("getMessages", Some(json!({ "counterpart": "alice" })))
        .await;
    let page: Vec<&str> = first["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["contents"].as_str().unwrap())
        .collect();
    assert_eq!(page, vec!["m0", "m1", "m2", "m3", "m4", "m5", "m6", "m7", "m8", "m9"]);

    let second = bob
        .command(
            "getMessages",
            Some(json!({ "counterpart": "alice", "since": first["nextSince"] })),
        )
        .await;
    let page: Vec<&str> = second["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["contents"].as_str().unwrap())
        .collect();
    assert_eq!(page, vec!["m10", "m11"]);

    let empty = bob
        .command(
            "getMessages",
            Some(json!({ "counterpart": "alice", "since": second["nextSince"] })),
        )
        .await;
    assert_eq!(empty["messages"], json!([]));
    assert!(empty.get("nextSince").is_none());
}

#[tokio::test]
async fn test_message_rejections() {
    let (mut alice, _bob) = two_clients().await;

    let reply = alice
        .command("uploadMessage", Some(json!({ "receiver": "carol", "message": "hi" })))
        .await;
    assert_frame_err!(reply, "messageUpload", "ACCOUNT_NOT_FOUND");

    let reply = alice
        .command("uploadMessage", Some(json!({ "receiver": "bob", "message": "   " })))
        .await;
    assert_frame_err!(reply, "messageUpload", "INVALID_PAYLOAD");

    alice.send_text("uploadMessage");
    alice.send_text("not json");
    let reply = alice.next_frame().await;
    assert_frame_err!(reply, "messageUpload", "MALFORMED_PAYLOAD");
}

#[tokio::test]
async fn test_logout_ends_access() {
    let (mut alice, _bob) = two_clients().await;

    let reply = alice.command("logout", None).await;
    assert_frame_ok!(reply, "logoutResult");

    let reply = alice.command("getContacts", None).await;
    assert_frame_err!(reply, "contactsResult", "NOT_AUTHENTICATED");

    let reply = alice
        .command("login", Some(json!({ "email": "alice@example.com", "password": crate::common::PASSWORD })))
        .await;
    assert_frame_ok!(reply, "loginResult");
    assert_eq!(reply["username"], "alice");
    assert!(reply["token"].as_str().is_some());
}
