//! Wire protocol for wikirace.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Messages** ([`ClientMessage`], [`ServerEvent`]) — the requests and
//!   the events the server fans out to room members.
//! - **Snapshots** ([`RoomSnapshot`], [`PlayerSnapshot`]) — full room state
//!   as carried inside events.
//! - **Standings** ([`standings`]) — leaderboard ordering, shared so the
//!   server and the client projection rank players the same way.
//! - **Codec** ([`Codec`], [`JsonCodec`]) — how values become frame bytes.
//!
//! ```text
//! Transport (frames) → Protocol (messages) → Session / Room
//! ```

pub mod clock;
mod codec;
mod error;
mod messages;
pub mod standings;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use messages::{ClientMessage, DEFAULT_MAX_PLAYERS, ServerEvent};
pub use standings::{RankKey, Standing};
pub use types::{GameStatus, PlayerId, PlayerSnapshot, Recipient, RoomCode, RoomSnapshot};
