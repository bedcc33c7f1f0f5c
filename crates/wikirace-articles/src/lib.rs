//! Article source for wikirace.
//!
//! The race server never touches article content; clients do, before a
//! room exists and while racing. This crate gives them:
//!
//! - [`ArticleSource`] — "fetch article HTML" and "fetch a random title"
//! - [`WikipediaClient`] — the MediaWiki-backed implementation
//! - [`resolve`] — turns a [`LevelChoice`] into validated start and target
//!   articles

mod config;
mod error;
mod setup;
mod source;
mod wikipedia;

pub use config::WikipediaConfig;
pub use error::{ArticleError, SetupError};
pub use setup::{LEVELS, Level, LevelChoice, RaceSetup, resolve};
pub use source::ArticleSource;
pub use wikipedia::WikipediaClient;
