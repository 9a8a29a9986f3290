//! Connection hub under load

use std::time::Duration;

use conduit::backend::connection::ConnectionConfig;
use conduit::backend::realtime::Hub;
use serde_json::json;
use tokio::sync::mpsc;

use crate::common::{dispatcher_with, gateway_with, memory_storage, TestClient};

#[tokio::test]
async fn test_broadcast_reaches_every_queue_in_order() {
    let hub = Hub::spawn();
    let mut receivers = Vec::new();
    for i in 0..100 {
        let (tx, rx) = mpsc::channel(64);
        hub.register(format!("c{}", i), tx).unwrap();
        receivers.push(rx);
    }
    assert_eq!(hub.connection_count().await.unwrap(), 100);

    for n in 0..50 {
        hub.broadcast(n.to_string()).unwrap();
    }

    for rx in receivers.iter_mut() {
        for n in 0..50 {
            assert_eq!(rx.recv().await, Some(n.to_string()));
        }
    }
}

#[tokio::test]
async fn test_concurrent_registration_and_removal() {
    let hub = Hub::spawn();
    let mut tasks = Vec::new();
    for i in 0..32 {
        let hub = hub.clone();
        tasks.push(tokio::spawn(async move {
            let id = format!("c{}", i);
            let (tx, mut rx) = mpsc::channel(4);
            hub.register(id.clone(), tx).unwrap();
            if i % 2 == 0 {
                hub.unregister(id).unwrap();
                // The hub held the only sender.
                assert_eq!(rx.recv().await, None);
            }
            rx
        }));
    }

    let mut kept = Vec::new();
    for task in tasks {
        kept.push(task.await.unwrap());
    }
    assert_eq!(hub.connection_count().await.unwrap(), 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_register_broadcast_unregister_stress() {
    let hub = Hub::spawn();
    let mut tasks = Vec::new();
    for i in 0..200 {
        let hub = hub.clone();
        tasks.push(tokio::spawn(async move {
            let id = format!("c{}", i);
            let (tx, mut rx) = mpsc::channel(16);
            hub.register(id.clone(), tx).unwrap();
            hub.broadcast(format!("from {}", i)).unwrap();
            hub.unregister(id).unwrap();

            // Unregister closes the queue, so draining terminates.
            let mut received = 0;
            while rx.recv().await.is_some() {
                received += 1;
            }
            received
        }));
    }

    let run = async {
        for task in tasks {
            let received = task.await.unwrap();
            // At least its own broadcast, at most the queue capacity.
            assert!((1..=16).contains(&received), "received {}", received);
        }
    };
    tokio::time::timeout(Duration::from_secs(10), run)
        .await
        .expect("hub stress deadlocked");

    assert_eq!(hub.connection_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_broadcast_reaches_live_connections() {
    let hub = Hub::spawn();
    let dispatcher = dispatcher_with(gateway_with(memory_storage()));
    let mut a = TestClient::connect("a", hub.clone(), dispatcher.clone(), ConnectionConfig::default());
    let mut b = TestClient::connect("b", hub.clone(), dispatcher, ConnectionConfig::default());

    // Wait for both workers to register.
    tokio::time::timeout(Duration::from_secs(5), async {
        while hub.connection_count().await.unwrap() < 2 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();

    hub.broadcast(json!({ "command": "notice", "text": "maintenance" }).to_string())
        .unwrap();

    assert_eq!(a.next_frame().await["text"], "maintenance");
    assert_eq!(b.next_frame().await["text"], "maintenance");
}
