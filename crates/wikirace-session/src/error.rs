//! Error types for the session layer.

use wikirace_protocol::{PlayerId, RoomCode};

/// Errors that can occur during session bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session exists for the given player. The connection was never
    /// registered or has already been torn down.
    #[error("session not found for player {0}")]
    NotFound(PlayerId),

    /// The player already has a live session.
    #[error("player {0} already has an active session")]
    AlreadyConnected(PlayerId),

    /// The player is already bound to a room and must leave it first.
    #[error("player {player_id} is already in room {room}")]
    AlreadyInRoom { player_id: PlayerId, room: RoomCode },
}
