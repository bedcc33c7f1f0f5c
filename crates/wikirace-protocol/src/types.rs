//! Identity types and the room/player snapshots that travel on the wire.
//!
//! Snapshots are plain data: the server builds them from its authoritative
//! room state and clients rebuild their local view from them. Field names
//! are camelCase on the wire because the clients are browser code.

use std::fmt;

use serde::{Deserialize, Serialize};
use wikirace_transport::ConnectionId;

use crate::standings::{self, RankKey, Standing};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identity of a player.
///
/// A player id is the id of the connection that created it, so it lives
/// exactly as long as that connection. A reconnecting client gets a new
/// connection id and therefore a new player.
///
/// `#[serde(transparent)]` puts it on the wire as a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl From<ConnectionId> for PlayerId {
    fn from(id: ConnectionId) -> Self {
        Self(id.into_inner())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// The short, shareable code that identifies a live room.
///
/// Codes are case-insensitive on input: every way of constructing one
/// (including deserialization) trims and uppercases, so a `RoomCode` is
/// always in canonical form and can be compared and hashed directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Returns the canonical (uppercase) code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RoomCode {
    fn from(raw: String) -> Self {
        Self(raw.trim().to_uppercase())
    }
}

impl From<&str> for RoomCode {
    fn from(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who inside a room receives an event.
///
/// Room operations return `(Recipient, ServerEvent)` pairs and the room's
/// actor resolves them against its current member list at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every current member of the room.
    All,
    /// One member.
    Player(PlayerId),
}

// ---------------------------------------------------------------------------
// GameStatus
// ---------------------------------------------------------------------------

/// Lifecycle of a room.
///
/// ```text
/// Waiting ──(host starts)──→ Playing ──(everyone finished)──→ Finished
/// ```
///
/// There is no way back to `Waiting`, and `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Accepting joins, no clock running.
    #[default]
    Waiting,
    /// Clock running, navigation accepted.
    Playing,
    /// Everyone reached the target.
    Finished,
}

impl GameStatus {
    /// Returns `true` if the room accepts new players.
    pub fn is_joinable(self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` if navigation moves are accepted.
    pub fn accepts_moves(self) -> bool {
        matches!(self, Self::Playing)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Playing => write!(f, "playing"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// One player's progress as seen on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub current_article: String,
    /// Every article visited, starting with the room's start article.
    pub path: Vec<String>,
    /// Whole seconds between game start and this player's latest move.
    pub time_taken: u64,
    pub is_finished: bool,
    /// Unix milliseconds at which the player reached the target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_time: Option<u64>,
}

impl PlayerSnapshot {
    /// Ranking key using the server-stamped finish time.
    pub fn rank_key(&self) -> RankKey {
        RankKey {
            finish_time: self.finish_time,
            path_length: self.path.len(),
        }
    }
}

/// A full room, with players listed in join order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub id: RoomCode,
    pub players: Vec<PlayerSnapshot>,
    pub start_article: String,
    pub target_article: String,
    pub game_status: GameStatus,
    /// Unix milliseconds at which the host started the game.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<u64>,
    pub max_players: usize,
    pub created_by: PlayerId,
}

impl RoomSnapshot {
    /// Looks up a player by id.
    pub fn player(&self, id: PlayerId) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Leaderboard order for this snapshot. `Standing::index` points into
    /// `self.players`.
    pub fn standings(&self) -> Vec<Standing> {
        let keys: Vec<RankKey> = self.players.iter().map(PlayerSnapshot::rank_key).collect();
        standings::standings(&keys)
    }
}
