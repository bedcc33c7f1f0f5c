//! Player sessions for wikirace.
//!
//! A session is the server's record of one live connection: which player it
//! plays as and which room, if any, it is currently bound to. Sessions are
//! the source of truth for "where is this connection", so the disconnect
//! path can find the room to clean up without scanning every room.
//!
//! ```text
//! Room Layer (above)     ← told which room a departing player was in
//!     ↕
//! Session Layer (this crate)
//!     ↕
//! Protocol Layer (below) ← PlayerId, RoomCode
//! ```

mod error;
mod manager;
mod session;

pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{Session, SessionState};
