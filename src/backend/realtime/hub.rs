/**
 * Connection Hub
 *
 * Registry of live connections and fan-out point for broadcasts. A single
 * task owns the registry; everything else talks to it through a cloneable
 * `HubHandle` that sends `HubEvent`s over an unbounded channel. Events are
 * applied one at a time, so queries never observe a half-applied change.
 *
 * # Outbound Queues
 *
 * Each registered connection hands the hub the only strong sender of its
 * bounded outbound queue. Unregistering drops that sender, which closes the
 * queue and lets the connection's outbound pump finish.
 *
 * # Broadcast Policy
 *
 * Broadcasts never block the hub:
 * - full queue: the new frame is dropped for that connection only
 * - closed queue: the connection is pruned from the registry
 */

use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Sending half of a connection's outbound queue
pub type OutboundSender = mpsc::Sender<String>;

/// Requests applied by the hub task
#[derive(Debug)]
pub enum HubEvent {
    Register {
        connection_id: String,
        outbound: OutboundSender,
    },
    Unregister {
        connection_id: String,
    },
    Broadcast {
        payload: String,
    },
    IsRegistered {
        connection_id: String,
        reply: oneshot::Sender<bool>,
    },
    Count {
        reply: oneshot::Sender<usize>,
    },
}

/// Hub failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HubError {
    /// The hub task has stopped
    #[error("connection hub is not running")]
    Closed,

    /// Outbound writes join queued frames with newlines, so a payload may
    /// not contain one
    #[error("broadcast payload contains a newline")]
    MultilinePayload,
}

/// Cloneable access to a running hub
#[derive(Debug, Clone)]
pub struct HubHandle {
    events: mpsc::UnboundedSender<HubEvent>,
}

impl HubHandle {
    fn send(&self, event: HubEvent) -> Result<(), HubError> {
        self.events.send(event).map_err(|_| HubError::Closed)
    }

    /// Add a connection; an existing entry with the same id is replaced
    pub fn register(
        &self,
        connection_id: impl Into<String>,
        outbound: OutboundSender,
    ) -> Result<(), HubError> {
        self.send(HubEvent::Register {
            connection_id: connection_id.into(),
            outbound,
        })
    }

    /// Remove a connection and close its queue; unknown ids are ignored
    pub fn unregister(&self, connection_id: impl Into<String>) -> Result<(), HubError> {
        self.send(HubEvent::Unregister {
            connection_id: connection_id.into(),
        })
    }

    /// Queue `payload` on every registered connection
    ///
    /// `payload` must be a single line; compact JSON always is.
    pub fn broadcast(&self, payload: impl Into<String>) -> Result<(), HubError> {
        let payload = payload.into();
        if payload.contains('\n') {
            return Err(HubError::MultilinePayload);
        }
        self.send(HubEvent::Broadcast { payload })
    }

    pub async fn is_registered(&self, connection_id: impl Into<String>) -> Result<bool, HubError> {
        let (reply, answer) = oneshot::channel();
        self.send(HubEvent::IsRegistered {
            connection_id: connection_id.into(),
            reply,
        })?;
        answer.await.map_err(|_| HubError::Closed)
    }

    pub async fn connection_count(&self) -> Result<usize, HubError> {
        let (reply, answer) = oneshot::channel();
        self.send(HubEvent::Count { reply })?;
        answer.await.map_err(|_| HubError::Closed)
    }
}

/// The registry owner
#[derive(Debug)]
pub struct Hub {
    connections: HashMap<String, OutboundSender>,
    events: mpsc::UnboundedReceiver<HubEvent>,
}

impl Hub {
    pub fn new() -> (Self, HubHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let hub = Self {
            connections: HashMap::new(),
            events: rx,
        };
        (hub, HubHandle { events: tx })
    }

    /// Start a hub on the current runtime
    pub fn spawn() -> HubHandle {
        let (hub, handle) = Self::new();
        tokio::spawn(hub.run());
        handle
    }

    /// Apply events until every handle is dropped
    pub async fn run(mut self) {
        info!("[Hub] Started");
        while let Some(event) = self.events.recv().await {
            self.apply(event);
        }
        info!("[Hub] Stopped with {} connections", self.connections.len());
    }

    fn apply(&mut self, event: HubEvent) {
        match event {
            HubEvent::Register {
                connection_id,
                outbound,
            } => {
                if self.connections.insert(connection_id.clone(), outbound).is_some() {
                    warn!("[Hub] Replaced existing registration for {}", connection_id);
                }
                debug!("[Hub] Registered {} ({} live)", connection_id, self.connections.len());
            }
            HubEvent::Unregister { connection_id } => {
                if self.connections.remove(&connection_id).is_some() {
                    debug!("[Hub] Unregistered {} ({} live)", connection_id, self.connections.len());
                }
            }
            HubEvent::Broadcast { payload } => self.broadcast(payload),
            HubEvent::IsRegistered {
                connection_id,
                reply,
            } => {
                let _ = reply.send(self.connections.contains_key(&connection_id));
            }
            HubEvent::Count { reply } => {
                let _ = reply.send(self.connections.len());
            }
        }
    }

    fn broadcast(&mut self, payload: String) {
        let mut closed = Vec::new();

        for (connection_id, outbound) in &self.connections {
            match outbound.try_send(payload.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!("[Hub] Outbound queue full for {}, dropping frame", connection_id);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    closed.push(connection_id.clone());
                }
            }
        }

        for connection_id in closed {
            debug!("[Hub] Pruning closed connection {}", connection_id);
            self.connections.remove(&connection_id);
        }
    }
}
