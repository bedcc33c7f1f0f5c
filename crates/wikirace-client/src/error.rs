//! Error types for the client.

use tokio_tungstenite::tungstenite;
use wikirace_protocol::ProtocolError;

/// Errors that can occur while talking to a wikirace server.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The WebSocket handshake failed.
    #[error("failed to connect: {0}")]
    Connect(#[source] tungstenite::Error),

    /// Writing a frame failed.
    #[error("failed to send: {0}")]
    Send(#[source] tungstenite::Error),

    /// Reading a frame failed.
    #[error("failed to receive: {0}")]
    Receive(#[source] tungstenite::Error),

    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The request needs a room but the view has none.
    #[error("not in a room")]
    NotInRoom,
}
