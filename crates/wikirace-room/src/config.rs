//! Room-level settings.

use wikirace_protocol::DEFAULT_MAX_PLAYERS;

use crate::RoomError;

/// Settings shared by every room a registry creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomConfig {
    /// Number of characters in a generated room code.
    pub code_length: usize,

    /// Capacity used when a create request doesn't name one.
    pub default_max_players: usize,

    /// Largest capacity a create request may ask for.
    pub max_players_limit: usize,

    /// Bound on each room actor's command queue. When a queue is full,
    /// senders wait.
    pub command_queue: usize,
}

/// Smallest capacity a room may have. A race needs two.
pub const MIN_PLAYERS: usize = 2;

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            default_max_players: DEFAULT_MAX_PLAYERS,
            max_players_limit: 8,
            command_queue: 64,
        }
    }
}

impl RoomConfig {
    /// Checks a requested capacity against `MIN_PLAYERS..=max_players_limit`.
    pub fn validate_capacity(&self, requested: usize) -> Result<usize, RoomError> {
        if (MIN_PLAYERS..=self.max_players_limit).contains(&requested) {
            Ok(requested)
        } else {
            Err(RoomError::InvalidRequest(format!(
                "maxPlayers must be between {MIN_PLAYERS} and {}",
                self.max_players_limit
            )))
        }
    }
}
