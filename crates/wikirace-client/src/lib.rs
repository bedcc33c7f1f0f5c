//! Client side of wikirace.
//!
//! - [`ClientView`] — a pure reducer that folds server events into a local,
//!   read-only picture of the room
//! - [`RaceClient`] — a WebSocket connection that sends requests and keeps
//!   a `ClientView` up to date with everything it receives

mod client;
mod error;
mod projection;

pub use client::RaceClient;
pub use error::ClientError;
pub use projection::{ClientView, StandingRow};
