//! # Wikirace
//!
//! Room coordination server for multiplayer wiki races.
//!
//! Players connect over WebSocket, create or join a room by its short code,
//! and race from a start article to a target article. The server keeps the
//! authoritative room state (who is in, who moved where, who finished when)
//! and fans every change out to the room's members. Article content never
//! passes through the server.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wikirace::prelude::*;
//!
//! # async fn run() -> Result<(), WikiraceError> {
//! let server = WikiraceServer::builder()
//!     .config(ServerConfig::from_env()?)
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
pub mod logging;
mod server;

pub use config::{ConfigError, ServerConfig};
pub use error::WikiraceError;
pub use server::{WikiraceServer, WikiraceServerBuilder};

/// Everything needed to run a server or talk to one.
pub mod prelude {
    pub use crate::{ConfigError, ServerConfig, WikiraceError, WikiraceServer, WikiraceServerBuilder};

    pub use wikirace_articles::{
        ArticleError, ArticleSource, LEVELS, Level, LevelChoice, RaceSetup, SetupError,
        WikipediaClient, WikipediaConfig, resolve,
    };
    pub use wikirace_client::{ClientError, ClientView, RaceClient, StandingRow};
    pub use wikirace_protocol::{
        ClientMessage, Codec, GameStatus, JsonCodec, PlayerId, PlayerSnapshot, ProtocolError,
        RoomCode, RoomSnapshot, ServerEvent,
    };
    pub use wikirace_room::{RoomConfig, RoomError, RoomRegistry};
    pub use wikirace_session::SessionError;
    pub use wikirace_transport::TransportError;
}
