/**
 * Inbound Pump
 *
 * Reads commands off the transport and queues one result frame per command.
 * A command is a text frame holding its tag; commands that carry data are
 * followed by a second text frame with the JSON payload.
 *
 * Every read is bounded by the liveness window. Pings and pongs count as
 * activity but are otherwise ignored.
 */

use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, error};

use super::dispatch::Dispatcher;
use super::frame::{Frame, TransportError};
use super::ConnectionConfig;
use crate::shared::protocol::{CommandTag, ServerFrame};

/// Next text frame, or `None` once the peer has closed
async fn next_text<St>(frames: &mut St, config: &ConnectionConfig) -> Result<Option<String>, TransportError>
where
    St: Stream<Item = Result<Frame, TransportError>> + Unpin,
{
    loop {
        let next = timeout(config.pong_wait, frames.next())
            .await
            .map_err(|_| TransportError::ReadTimeout(config.pong_wait))?;

        let frame = match next {
            Some(frame) => frame?,
            None => return Ok(None),
        };

        if frame.len() > config.max_frame_bytes {
            return Err(TransportError::FrameTooLarge {
                size: frame.len(),
                max: config.max_frame_bytes,
            });
        }

        match frame {
            Frame::Text(text) => return Ok(Some(text)),
            Frame::Ping(_) | Frame::Pong(_) => continue,
            Frame::Binary(_) => return Err(TransportError::UnsupportedFrame),
            Frame::Close => return Ok(None),
        }
    }
}

/// Read and dispatch commands until the peer leaves or the transport fails
///
/// `outbound` is weak: once the hub drops the queue's strong sender the pump
/// has nowhere to reply and stops.
pub async fn inbound_pump<St>(
    connection_id: String,
    mut frames: St,
    dispatcher: Dispatcher,
    outbound: mpsc::WeakSender<String>,
    config: ConnectionConfig,
) -> Result<(), TransportError>
where
    St: Stream<Item = Result<Frame, TransportError>> + Unpin,
{
    loop {
        let Some(command) = next_text(&mut frames, &config).await? else {
            return Ok(());
        };

        let response = match CommandTag::parse(&command) {
            Some(tag) => {
                let payload = if tag.takes_payload() {
                    match next_text(&mut frames, &config).await? {
                        Some(payload) => Some(payload),
                        None => return Ok(()),
                    }
                } else {
                    None
                };
                debug!("[Conn] {} -> {}", connection_id, tag);
                dispatcher.dispatch(&connection_id, tag, payload.as_deref()).await
            }
            None => {
                debug!("[Conn] {} sent unknown command {:?}", connection_id, command);
                ServerFrame::unknown_command()
            }
        };

        let text = match response.to_text() {
            Ok(text) => text,
            Err(e) => {
                error!("[Conn] Failed to encode {}: {}", response.name(), e);
                continue;
            }
        };

        let Some(queue) = outbound.upgrade() else {
            debug!("[Conn] {} outbound queue closed", connection_id);
            return Ok(());
        };
        if queue.send(text).await.is_err() {
            return Ok(());
        }
    }
}
