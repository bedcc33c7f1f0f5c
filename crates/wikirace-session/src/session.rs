//! Session types: what the server remembers about one connection.

use std::time::Instant;

use wikirace_protocol::{PlayerId, RoomCode};

/// Where a connected player currently is.
///
/// ```text
///   Lobby ──(create / join)──→ InRoom ──(leave)──→ Lobby
/// ```
///
/// Disconnecting from either state removes the session entirely; there is
/// no reconnection, so a dropped player comes back as a new player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, not a member of any room.
    Lobby,

    /// Member of the given room.
    InRoom(RoomCode),
}

/// A single connection's session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Which player this session belongs to.
    pub player_id: PlayerId,

    /// Room membership.
    pub state: SessionState,

    /// When the connection was accepted.
    pub connected_at: Instant,
}

impl Session {
    pub(crate) fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            state: SessionState::Lobby,
            connected_at: Instant::now(),
        }
    }

    /// The room this session is bound to, if any.
    pub fn room(&self) -> Option<&RoomCode> {
        match &self.state {
            SessionState::Lobby => None,
            SessionState::InRoom(code) => Some(code),
        }
    }
}
