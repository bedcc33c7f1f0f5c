//! A racer inside a room.

use wikirace_protocol::{PlayerId, PlayerSnapshot};

/// One member's progress.
///
/// `path` is never empty and its last entry is always the current article.
/// A player is finished exactly when `finish_time` is set.
#[derive(Debug, Clone)]
pub struct Player {
    pub(crate) id: PlayerId,
    pub(crate) name: String,
    pub(crate) path: Vec<String>,
    pub(crate) time_taken: u64,
    pub(crate) finish_time: Option<u64>,
}

impl Player {
    pub(crate) fn new(id: PlayerId, name: String, start_article: &str) -> Self {
        Self {
            id,
            name,
            path: vec![start_article.to_owned()],
            time_taken: 0,
            finish_time: None,
        }
    }

    /// The member's connection identity.
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Display name given at create or join.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The last article on the path.
    pub fn current_article(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    /// Every article visited, starting with the start article.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Seconds from race start to the last accepted move.
    pub fn time_taken(&self) -> u64 {
        self.time_taken
    }

    /// Server millis at which the target was reached.
    pub fn finish_time(&self) -> Option<u64> {
        self.finish_time
    }

    pub fn is_finished(&self) -> bool {
        self.finish_time.is_some()
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            name: self.name.clone(),
            current_article: self.current_article().to_owned(),
            path: self.path.clone(),
            time_taken: self.time_taken,
            is_finished: self.is_finished(),
            finish_time: self.finish_time,
        }
    }
}
