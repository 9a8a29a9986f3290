/**
 * Transport Frames
 *
 * The connection pumps work on `Frame`s rather than on a specific WebSocket
 * library's message type, so they can be driven by any stream/sink pair.
 * `split_websocket` adapts an axum `WebSocket` to that shape.
 */

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{future, Sink, SinkExt, Stream, StreamExt};
use thiserror::Error;

/// One frame on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close,
}

impl Frame {
    /// Payload size in bytes
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Binary(data) | Self::Ping(data) | Self::Pong(data) => data.len(),
            Self::Close => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Failures that end a connection
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Nothing arrived within the liveness window
    #[error("no frame received for {0:?}")]
    ReadTimeout(Duration),

    /// A write did not complete in time
    #[error("write did not complete within {0:?}")]
    WriteTimeout(Duration),

    /// Inbound frame over the configured limit
    #[error("frame of {size} bytes exceeds the {max} byte limit")]
    FrameTooLarge { size: usize, max: usize },

    /// Binary data frames are not part of the protocol
    #[error("binary frames are not supported")]
    UnsupportedFrame,

    /// The peer closed the connection
    #[error("connection closed by peer")]
    Closed,

    /// Underlying socket failure
    #[error("socket error: {0}")]
    Socket(String),
}

impl TransportError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ReadTimeout(_) => "READ_TIMEOUT",
            Self::WriteTimeout(_) => "WRITE_TIMEOUT",
            Self::FrameTooLarge { .. } => "FRAME_TOO_LARGE",
            Self::UnsupportedFrame => "UNSUPPORTED_FRAME",
            Self::Closed => "CLOSED",
            Self::Socket(_) => "SOCKET_ERROR",
        }
    }
}

impl From<axum::Error> for TransportError {
    fn from(err: axum::Error) -> Self {
        Self::Socket(err.to_string())
    }
}

impl From<Message> for Frame {
    fn from(message: Message) -> Self {
        match message {
            Message::Text(text) => Frame::Text(text.as_str().to_owned()),
            Message::Binary(data) => Frame::Binary(data.to_vec()),
            Message::Ping(data) => Frame::Ping(data.to_vec()),
            Message::Pong(data) => Frame::Pong(data.to_vec()),
            Message::Close(_) => Frame::Close,
        }
    }
}

impl From<Frame> for Message {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Text(text) => Message::Text(text.into()),
            Frame::Binary(data) => Message::Binary(data.into()),
            Frame::Ping(data) => Message::Ping(data.into()),
            Frame::Pong(data) => Message::Pong(data.into()),
            Frame::Close => Message::Close(None),
        }
    }
}

/// Split a WebSocket into a frame stream and a frame sink
///
/// ```rust,no_run
/// use axum::extract::ws::WebSocket;
/// use conduit::backend::connection::{split_websocket, Frame};
/// use futures_util::SinkExt;
///
/// async fn greet(socket: WebSocket) {
///     let (_frames, mut sink) = split_websocket(socket);
///     let _ = sink.send(Frame::Text("hello".to_string())).await;
/// }
/// ```
pub fn split_websocket(
    socket: WebSocket,
) -> (
    impl Stream<Item = Result<Frame, TransportError>> + Unpin + Send,
    impl Sink<Frame, Error = TransportError> + Unpin + Send,
) {
    let (sink, stream): (SplitSink<WebSocket, Message>, SplitStream<WebSocket>) = socket.split();

    let frames = stream.map(|item| item.map(Frame::from).map_err(TransportError::from));
    let sink = sink
        .sink_map_err(TransportError::from)
        .with(|frame: Frame| future::ready(Ok::<Message, TransportError>(frame.into())));

    (frames, sink)
}
