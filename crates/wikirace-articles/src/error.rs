//! Error types for article fetching and race setup.

/// Errors from an [`ArticleSource`](crate::ArticleSource).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArticleError {
    /// The article does not exist.
    #[error("article not found: {0}")]
    NotFound(String),

    /// The service failed or answered with something unusable.
    #[error("article service error: {0}")]
    Service(String),
}

/// Errors while resolving a level choice into a race.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    /// No preset has this id.
    #[error("unknown level: {0}")]
    UnknownLevel(String),

    /// A custom start or target title was blank.
    #[error("{0} article must not be empty")]
    EmptyTitle(&'static str),

    /// Fetching one of the race's articles failed.
    #[error("could not load {title}: {source}")]
    Article {
        title: String,
        #[source]
        source: ArticleError,
    },
}
