//! Session gateway integration tests
//!
//! Every identity-scoped operation must refuse an unbound connection
//! without touching storage.

use std::sync::Arc;

use assert_matches::assert_matches;
use conduit::backend::auth::BindingError;
use conduit::backend::gateway::GatewayError;
use conduit::backend::storage::{StorageError, StorageGateway};
use conduit::shared::NewListing;

use crate::common::{gateway_with, CountingStorage, PASSWORD};

fn listing() -> NewListing {
    NewListing {
        title: "Lamp".to_string(),
        description: String::new(),
        images: Vec::new(),
        price: 10,
        symbol: "EUR".to_string(),
    }
}

#[tokio::test]
async fn test_unbound_connection_never_reaches_storage() {
    let storage = Arc::new(CountingStorage::new());
    let gateway = gateway_with(storage.clone());

    assert_matches!(
        gateway.send_message("c1", "bob", "hi").await,
        Err(GatewayError::NotAuthenticated)
    );
    assert_matches!(
        gateway.get_messages("c1", "bob", 0).await,
        Err(GatewayError::NotAuthenticated)
    );
    assert_matches!(
        gateway.upload_listing("c1", listing()).await,
        Err(GatewayError::NotAuthenticated)
    );
    assert_matches!(
        gateway.buy_listing("c1", 1, 10).await,
        Err(GatewayError::NotAuthenticated)
    );
    assert_matches!(gateway.get_listing("c1", 1).await, Err(GatewayError::NotAuthenticated));
    assert_matches!(gateway.get_contacts("c1").await, Err(GatewayError::NotAuthenticated));

    assert_eq!(storage.calls(), 0);
}

#[tokio::test]
async fn test_bound_connection_cannot_login_again() {
    let storage = Arc::new(CountingStorage::new());
    let gateway = gateway_with(storage.clone());

    gateway.register("c1", "alice", "alice@example.com", PASSWORD).await.unwrap();
    let calls = storage.calls();

    let err = gateway.login("c1", "alice@example.com", PASSWORD).await.unwrap_err();
    assert_matches!(err, GatewayError::Binding(BindingError::AlreadyBound { .. }));
    assert_eq!(err.code(), "ALREADY_LOGGED_IN");
    assert_eq!(storage.calls(), calls);
}

#[tokio::test]
async fn test_one_account_on_two_connections() {
    let gateway = gateway_with(Arc::new(CountingStorage::new()));
    gateway.create_profile("alice", "alice@example.com", PASSWORD).await.unwrap();

    assert_eq!(gateway.login("c1", "alice@example.com", PASSWORD).await.unwrap(), "alice");
    assert_eq!(gateway.login("c2", "alice", PASSWORD).await.unwrap(), "alice");
    assert_eq!(gateway.bindings().len(), 2);

    gateway.logout("c1").unwrap();
    assert!(!gateway.is_logged_in("c1"));
    assert!(gateway.is_logged_in("c2"));
}

#[tokio::test]
async fn test_failed_login_leaves_connection_unbound() {
    let gateway = gateway_with(Arc::new(CountingStorage::new()));
    gateway.create_profile("alice", "alice@example.com", PASSWORD).await.unwrap();

    assert_matches!(
        gateway.login("c1", "alice@example.com", "Wrong123456!").await,
        Err(GatewayError::Storage(StorageError::InvalidCredentials))
    );
    assert!(!gateway.is_logged_in("c1"));
}

#[tokio::test]
async fn test_logout_and_release() {
    let gateway = gateway_with(Arc::new(CountingStorage::new()));

    let err = gateway.logout("c1").unwrap_err();
    assert_eq!(err.code(), "NOT_BOUND");

    gateway.register("c1", "alice", "alice@example.com", PASSWORD).await.unwrap();
    gateway.release("c1");
    gateway.release("c1");
    assert!(gateway.bindings().is_empty());
}

#[tokio::test]
async fn test_alice_says_hi_through_the_gateway() {
    let storage = Arc::new(CountingStorage::new());
    let gateway = gateway_with(storage.clone());

    gateway.create_profile("alice", "alice@example.com", PASSWORD).await.unwrap();
    gateway.create_profile("bob", "bob@example.com", PASSWORD).await.unwrap();
    gateway.bindings().bind("c1", "alice").unwrap();

    gateway.send_message("c1", "bob", "hi").await.unwrap();

    let messages = storage.get_messages("bob", "alice", 0).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].contents, "hi");
    assert!(!messages[0].sent_by_viewer);

    // An unbound connection still cannot list anything.
    let before = storage.calls();
    assert_matches!(
        gateway.upload_listing("c2", listing()).await,
        Err(GatewayError::NotAuthenticated)
    );
    assert_eq!(storage.calls(), before);
}
