/**
 * Outbound Pump
 *
 * Drains a connection's queue onto the transport. Frames already waiting
 * when a write starts are joined with newlines into that same write. A ping
 * goes out once the connection has been idle for a whole ping period; every
 * write is bounded by the write timeout.
 * When the queue closes the pump sends a close frame and stops.
 */

use std::time::Duration;

use futures_util::{Sink, SinkExt};
use tokio::sync::mpsc;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tracing::debug;

use super::frame::{Frame, TransportError};
use super::ConnectionConfig;

async fn write<Si>(sink: &mut Si, frame: Frame, wait: Duration) -> Result<(), TransportError>
where
    Si: Sink<Frame, Error = TransportError> + Unpin,
{
    timeout(wait, sink.send(frame))
        .await
        .map_err(|_| TransportError::WriteTimeout(wait))?
}

/// Join `first` with everything already queued behind it
fn coalesce(first: String, queue: &mut mpsc::Receiver<String>) -> String {
    let mut batch = first;
    while let Ok(next) = queue.try_recv() {
        batch.push('\n');
        batch.push_str(&next);
    }
    batch
}

pub async fn outbound_pump<Si>(
    connection_id: String,
    mut queue: mpsc::Receiver<String>,
    mut sink: Si,
    config: ConnectionConfig,
) -> Result<(), TransportError>
where
    Si: Sink<Frame, Error = TransportError> + Unpin,
{
    let period = config.ping_period();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            next = queue.recv() => match next {
                Some(first) => {
                    let batch = coalesce(first, &mut queue);
                    write(&mut sink, Frame::Text(batch), config.write_wait).await?;
                    // Ping only after a full quiet period.
                    ticker.reset();
                }
                None => {
                    debug!("[Conn] {} queue closed, sending close frame", connection_id);
                    // The peer may already be gone.
                    let _ = write(&mut sink, Frame::Close, config.write_wait).await;
                    return Ok(());
                }
            },
            _ = ticker.tick() => {
                write(&mut sink, Frame::Ping(Vec::new()), config.write_wait).await?;
            }
        }
    }
}
