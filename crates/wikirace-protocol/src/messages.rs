//! Client requests and server events.
//!
//! Every frame is adjacently tagged:
//!
//! ```text
//! { "event": "navigate-article", "data": { "roomId": "K3Q9ZA", "articleTitle": "Canine" } }
//! ```
//!
//! Event names are kebab-case and payload fields camelCase, matching what
//! the browser client emits and listens for.

use serde::{Deserialize, Serialize};

use crate::{PlayerId, RoomCode, RoomSnapshot};

/// Capacity a server uses when `create-room` omits `maxPlayers`, unless
/// configured otherwise.
pub const DEFAULT_MAX_PLAYERS: usize = 4;

/// Messages a client sends to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    /// Open a new room with the sender as host and only member.
    CreateRoom {
        player_name: String,
        start_article: String,
        target_article: String,
        /// `None` means the server's default capacity.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_players: Option<usize>,
    },

    /// Join a waiting room by its code.
    JoinRoom {
        room_id: RoomCode,
        player_name: String,
    },

    /// Host only: start the clock.
    StartGame { room_id: RoomCode },

    /// The sender followed a link to `article_title`.
    NavigateArticle {
        room_id: RoomCode,
        article_title: String,
    },

    /// Graceful exit from the sender's room.
    LeaveRoom { room_id: RoomCode },

    /// Keep-alive. Answered with [`ServerEvent::Pong`].
    Ping { client_time: u64 },
}

/// Messages the server pushes to clients.
///
/// Who receives which event is decided by the room layer; see
/// [`Recipient`](crate::Recipient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// First frame on every connection: the id this connection plays as.
    Connected { player_id: PlayerId },

    /// To the creator only.
    RoomCreated {
        room_id: RoomCode,
        game_room: RoomSnapshot,
    },

    /// To the joiner only.
    RoomJoined { game_room: RoomSnapshot },

    /// Membership changed.
    RoomUpdated { game_room: RoomSnapshot },

    /// The host started the game.
    GameStarted { game_room: RoomSnapshot },

    /// A navigation was accepted.
    PlayerMoved {
        player_id: PlayerId,
        article_title: String,
        path_length: usize,
        time_taken: u64,
    },

    /// A player reached the target for the first time.
    PlayerFinished {
        player_id: PlayerId,
        player_name: String,
        time_taken: u64,
        path_length: usize,
    },

    /// Every member has finished.
    GameFinished { game_room: RoomSnapshot },

    /// A member disconnected or left. Sent to the members who remain.
    PlayerLeft { player_id: PlayerId },

    /// A request was rejected. Sent to the requester only.
    Error { message: String },

    /// Reply to [`ClientMessage::Ping`].
    Pong { client_time: u64, server_time: u64 },
}

impl ServerEvent {
    /// The wire name of this event, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::RoomCreated { .. } => "room-created",
            Self::RoomJoined { .. } => "room-joined",
            Self::RoomUpdated { .. } => "room-updated",
            Self::GameStarted { .. } => "game-started",
            Self::PlayerMoved { .. } => "player-moved",
            Self::PlayerFinished { .. } => "player-finished",
            Self::GameFinished { .. } => "game-finished",
            Self::PlayerLeft { .. } => "player-left",
            Self::Error { .. } => "error",
            Self::Pong { .. } => "pong",
        }
    }

    /// The room snapshot carried by this event, if any.
    pub fn snapshot(&self) -> Option<&RoomSnapshot> {
        match self {
            Self::RoomCreated { game_room, .. }
            | Self::RoomJoined { game_room }
            | Self::RoomUpdated { game_room }
            | Self::GameStarted { game_room }
            | Self::GameFinished { game_room } => Some(game_room),
            _ => None,
        }
    }
}
