//! Rooms for wikirace.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns the
//! race state and the members' outbound channels.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — creates rooms, finds them by code, drops empty ones
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`Room`] — the synchronous race state machine inside each actor
//! - [`RoomConfig`] — code length and capacity limits

mod actor;
mod code;
mod config;
mod error;
mod player;
mod registry;
mod room;

pub use actor::{PlayerSender, RoomHandle};
pub use config::{MIN_PLAYERS, RoomConfig};
pub use error::RoomError;
pub use player::Player;
pub use registry::{NewRoom, RoomRegistry};
pub use room::{Outbound, Room};
