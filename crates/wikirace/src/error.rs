//! Unified error type for wikirace.

use wikirace_articles::{ArticleError, SetupError};
use wikirace_client::ClientError;
use wikirace_protocol::ProtocolError;
use wikirace_room::RoomError;
use wikirace_session::SessionError;
use wikirace_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum WikiraceError {
    /// Listening, accepting, sending or receiving failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Session bookkeeping failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room rejected an operation.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// An article could not be fetched.
    #[error(transparent)]
    Article(#[from] ArticleError),

    /// A race could not be set up.
    #[error(transparent)]
    Setup(#[from] SetupError),

    /// The client connection failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Configuration was invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
