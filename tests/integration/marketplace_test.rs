//! Marketplace flow over live connections

use conduit::backend::connection::ConnectionConfig;
use conduit::backend::realtime::Hub;
use serde_json::json;

use crate::common::{dispatcher_with, gateway_with, memory_storage, registration, TestClient};
use crate::{assert_frame_err, assert_frame_ok};

#[tokio::test]
async fn test_upload_buy_and_fetch() {
    let hub = Hub::spawn();
    let dispatcher = dispatcher_with(gateway_with(memory_storage()));
    let mut seller = TestClient::connect("c-seller", hub.clone(), dispatcher.clone(), ConnectionConfig::default());
    let mut buyer = TestClient::connect("c-buyer", hub, dispatcher, ConnectionConfig::default());

    seller.command("registration", Some(registration("seller"))).await;
    buyer.command("registration", Some(registration("buyer"))).await;

    let reply = seller
        .command(
            "uploadListing",
            Some(json!({
                "title": "Bicycle",
                "description": "Blue, barely used",
                "images": ["https://img.example.com/bike.jpg"],
                "price": 150,
                "symbol": "EUR"
            })),
        )
        .await;
    assert_frame_ok!(reply, "listingUpload");
    let id = reply["id"].as_i64().unwrap();

    let reply = seller
        .command("buyListing", Some(json!({ "listingId": id, "amount": 150 })))
        .await;
    assert_frame_err!(reply, "purchaseResult", "SELF_PURCHASE");

    let reply = buyer
        .command("buyListing", Some(json!({ "listingId": id, "amount": 149 })))
        .await;
    assert_frame_err!(reply, "purchaseResult", "INSUFFICIENT_AMOUNT");

    let reply = buyer
        .command("buyListing", Some(json!({ "listingId": id, "amount": 150 })))
        .await;
    assert_frame_ok!(reply, "purchaseResult");

    let reply = buyer
        .command("buyListing", Some(json!({ "listingId": id, "amount": 150 })))
        .await;
    assert_frame_err!(reply, "purchaseResult", "ALREADY_SOLD");

    let reply = buyer.command("getListing", Some(json!({ "listingId": id }))).await;
    assert_frame_ok!(reply, "listingResult");
    assert_eq!(reply["listing"]["owner"], "seller");
    assert_eq!(reply["listing"]["active"], false);

    let reply = buyer.command("getListing", Some(json!({ "listingId": id + 100 }))).await;
    assert_frame_err!(reply, "listingResult", "LISTING_NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_listing_is_rejected() {
    let hub = Hub::spawn();
    let dispatcher = dispatcher_with(gateway_with(memory_storage()));
    let mut seller = TestClient::connect("c-seller", hub, dispatcher, ConnectionConfig::default());
    seller.command("registration", Some(registration("seller"))).await;

    let reply = seller
        .command("uploadListing", Some(json!({ "title": "Free", "price": 0, "symbol": "EUR" })))
        .await;
    assert_frame_err!(reply, "listingUpload", "INVALID_PAYLOAD");
}
