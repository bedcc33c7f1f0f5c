//! Room registry: creates rooms, finds them by code, forgets empty ones.
//!
//! The map lock is held only for map work (insert, get, remove). Room
//! operations run on a cloned [`RoomHandle`] after the lock is released,
//! so a slow room never blocks lookups of other rooms.

use std::collections::HashMap;

use tokio::sync::RwLock;
use wikirace_protocol::{PlayerId, RoomCode, RoomSnapshot};

use crate::actor::spawn_room;
use crate::{PlayerSender, Room, RoomConfig, RoomError, RoomHandle, code};

/// A `create-room` request after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoom {
    pub player_name: String,
    pub start_article: String,
    pub target_article: String,
    pub max_players: usize,
}

/// Every live room in the process.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomCode, RoomHandle>>,
    config: RoomConfig,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Opens a room with `creator` as host and sole member.
    ///
    /// The creator receives `room-created` and `room-updated` on `sender`.
    /// The code is unique among live rooms; it is regenerated on collision.
    pub async fn create_room(
        &self,
        creator: PlayerId,
        sender: PlayerSender,
        request: NewRoom,
    ) -> Result<RoomSnapshot, RoomError> {
        let player_name = required("playerName", &request.player_name)?;
        let start_article = required("startArticle", &request.start_article)?;
        let target_article = required("targetArticle", &request.target_article)?;
        let max_players = self.config.validate_capacity(request.max_players)?;

        let mut rooms = self.rooms.write().await;
        let room_code = loop {
            let candidate = code::generate(self.config.code_length);
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
            tracing::debug!(room_id = %candidate, "room code collision, regenerating");
        };

        let room = Room::new(
            room_code.clone(),
            creator,
            player_name,
            start_article,
            target_article,
            max_players,
        );
        let snapshot = room.snapshot();
        let handle = spawn_room(room, sender, self.config.command_queue);
        rooms.insert(room_code.clone(), handle);

        tracing::info!(
            room_id = %room_code,
            player_id = %creator,
            max_players,
            rooms = rooms.len(),
            "room created"
        );
        Ok(snapshot)
    }

    /// Finds a live room.
    pub async fn lookup(&self, code: &RoomCode) -> Result<RoomHandle, RoomError> {
        self.rooms
            .read()
            .await
            .get(code)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(code.clone()))
    }

    /// Adds `player_id` to the room; events reach them on `sender`.
    pub async fn join(
        &self,
        code: &RoomCode,
        player_id: PlayerId,
        player_name: &str,
        sender: PlayerSender,
    ) -> Result<RoomSnapshot, RoomError> {
        let player_name = required("playerName", player_name)?;
        let handle = self.lookup(code).await?;
        handle.join(player_id, player_name, sender).await
    }

    /// Starts the room's race on behalf of `player_id`.
    pub async fn start(&self, code: &RoomCode, player_id: PlayerId) -> Result<(), RoomError> {
        self.lookup(code).await?.start(player_id).await
    }

    /// Submits a move. Moves outside a running race are dropped by the room.
    pub async fn navigate(
        &self,
        code: &RoomCode,
        player_id: PlayerId,
        article_title: &str,
    ) -> Result<(), RoomError> {
        let article_title = required("articleTitle", article_title)?;
        self.lookup(code).await?.navigate(player_id, article_title).await
    }

    /// Removes `player_id` from the room and forgets the room if that
    /// emptied it.
    pub async fn leave(&self, code: &RoomCode, player_id: PlayerId) -> Result<(), RoomError> {
        let handle = self.lookup(code).await?;
        let remaining = handle.leave(player_id).await?;
        if remaining == 0 {
            self.remove_if_empty(code).await;
        }
        Ok(())
    }

    /// Current state of a room.
    pub async fn snapshot(&self, code: &RoomCode) -> Result<RoomSnapshot, RoomError> {
        self.lookup(code).await?.snapshot().await
    }

    /// Deletes the room if it has no members. This is the only way a room
    /// leaves the registry. Returns `true` if it was removed.
    pub async fn remove_if_empty(&self, code: &RoomCode) -> bool {
        let mut rooms = self.rooms.write().await;
        let empty = rooms.get(code).is_some_and(|h| h.member_count() == 0);
        if empty {
            rooms.remove(code);
            tracing::info!(room_id = %code, rooms = rooms.len(), "room destroyed");
        }
        empty
    }

    /// Number of live rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Codes of all live rooms.
    pub async fn room_codes(&self) -> Vec<RoomCode> {
        self.rooms.read().await.keys().cloned().collect()
    }
}

/// Trims `value` and rejects it if nothing is left.
fn required(field: &str, value: &str) -> Result<String, RoomError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RoomError::InvalidRequest(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_owned())
}
