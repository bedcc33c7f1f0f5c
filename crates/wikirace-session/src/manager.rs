//! The session manager: every live connection and its room binding.
//!
//! # Concurrency note
//!
//! `SessionManager` is NOT thread-safe by itself; it is a plain `HashMap`.
//! The server wraps it in a mutex and never holds that lock across an
//! `.await`, so every operation here is a short, synchronous critical
//! section.

use std::collections::HashMap;

use wikirace_protocol::{PlayerId, RoomCode};

use crate::{Session, SessionError, SessionState};

/// Tracks all connected players.
///
/// ## Lifecycle
///
/// ```text
/// create() ──→ bind() ──→ unbind() ──→ bind() ... ──→ disconnect()
///   [Lobby]    [InRoom]    [Lobby]                     [removed]
/// ```
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<PlayerId, Session>,
}

impl SessionManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly accepted connection.
    ///
    /// # Errors
    /// [`SessionError::AlreadyConnected`] if the id is already registered.
    pub fn create(&mut self, player_id: PlayerId) -> Result<&Session, SessionError> {
        use std::collections::hash_map::Entry;

        match self.sessions.entry(player_id) {
            Entry::Occupied(_) => Err(SessionError::AlreadyConnected(player_id)),
            Entry::Vacant(slot) => {
                tracing::info!(%player_id, "session created");
                Ok(slot.insert(Session::new(player_id)))
            }
        }
    }

    /// Records that the player is now a member of `room`.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`] if the player has no session
    /// - [`SessionError::AlreadyInRoom`] if the player is bound elsewhere
    pub fn bind(&mut self, player_id: PlayerId, room: RoomCode) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get_mut(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;

        if let SessionState::InRoom(current) = &session.state {
            return Err(SessionError::AlreadyInRoom {
                player_id,
                room: current.clone(),
            });
        }

        tracing::debug!(%player_id, room_id = %room, "session bound to room");
        session.state = SessionState::InRoom(room);
        Ok(())
    }

    /// Clears the player's room binding and returns the room it pointed at.
    ///
    /// Returns `Ok(None)` if the player was already in the lobby.
    pub fn unbind(&mut self, player_id: PlayerId) -> Result<Option<RoomCode>, SessionError> {
        let session = self
            .sessions
            .get_mut(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;

        match std::mem::replace(&mut session.state, SessionState::Lobby) {
            SessionState::Lobby => Ok(None),
            SessionState::InRoom(room) => {
                tracing::debug!(%player_id, room_id = %room, "session unbound from room");
                Ok(Some(room))
            }
        }
    }

    /// The room the player is bound to, if any.
    pub fn room_of(&self, player_id: PlayerId) -> Option<RoomCode> {
        self.sessions.get(&player_id).and_then(|s| s.room().cloned())
    }

    /// Removes the player's session and returns the room it was bound to,
    /// so the caller can run the room-side departure.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if the player has no session.
    pub fn disconnect(&mut self, player_id: PlayerId) -> Result<Option<RoomCode>, SessionError> {
        let session = self
            .sessions
            .remove(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;

        let room = match session.state {
            SessionState::Lobby => None,
            SessionState::InRoom(room) => Some(room),
        };
        tracing::info!(
            %player_id,
            room_id = ?room.as_ref().map(RoomCode::as_str),
            connected_for = ?session.connected_at.elapsed(),
            "session removed"
        );
        Ok(room)
    }

    /// Looks up a session by player ID.
    pub fn get(&self, player_id: &PlayerId) -> Option<&Session> {
        self.sessions.get(player_id)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
