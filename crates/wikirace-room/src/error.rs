//! Error types for the room layer.

use wikirace_protocol::RoomCode;

/// Errors that can occur during room operations.
///
/// The `Display` text is what the requester sees in its `error` event, so
/// it is written for players rather than operators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// No live room has this code.
    #[error("Room not found")]
    NotFound(RoomCode),

    /// The room is at capacity.
    #[error("Room is full")]
    RoomFull(RoomCode),

    /// Joins are only accepted while the room is waiting.
    #[error("Game already in progress")]
    GameAlreadyStarted(RoomCode),

    /// Only the room's creator may start the game.
    #[error("Not authorized to start game")]
    Unauthorized(RoomCode),

    /// The race is over and the room cannot be restarted.
    #[error("Game already finished")]
    GameFinished(RoomCode),

    /// A request field failed validation.
    #[error("{0}")]
    InvalidRequest(String),

    /// The player is already a member of a room.
    #[error("Already in room {0}")]
    AlreadyInRoom(RoomCode),

    /// The player is not a member of this room.
    #[error("Not in room {0}")]
    NotInRoom(RoomCode),
}
