//! Level presets and race setup.
//!
//! A race is set up before any room exists: the host picks a level, the
//! choice is resolved to a start and a target article, and both are
//! fetched once to prove they exist. Only then does the client send
//! `create-room`, so a failed fetch never leaves a half-made room behind.

use crate::{ArticleSource, SetupError};

/// A named start → target pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub start_article: &'static str,
    pub target_article: &'static str,
}

/// Built-in levels, easiest first.
pub static LEVELS: [Level; 3] = [
    Level {
        id: "easy",
        name: "Easy",
        description: "A straightforward path.",
        start_article: "Dog",
        target_article: "Canidae",
    },
    Level {
        id: "medium",
        name: "Medium",
        description: "A few more steps.",
        start_article: "Coffee",
        target_article: "Ethiopia",
    },
    Level {
        id: "hard",
        name: "Hard",
        description: "A challenging journey.",
        start_article: "Philosophy",
        target_article: "Quantum mechanics",
    },
];

impl Level {
    /// Looks up a preset by id, ignoring case.
    pub fn find(id: &str) -> Option<&'static Level> {
        LEVELS.iter().find(|l| l.id.eq_ignore_ascii_case(id.trim()))
    }
}

/// How the host wants to pick the articles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelChoice {
    /// One of [`LEVELS`], by id.
    Preset(String),
    /// Titles typed in by the host.
    Custom { start: String, target: String },
    /// Two random articles.
    Random,
}

/// Validated articles for a new room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceSetup {
    pub start_article: String,
    pub target_article: String,
}

/// Resolves `choice` and checks that both articles can be loaded.
pub async fn resolve<S: ArticleSource>(
    source: &S,
    choice: LevelChoice,
) -> Result<RaceSetup, SetupError> {
    let (start_article, target_article) = match choice {
        LevelChoice::Preset(id) => {
            let level = Level::find(&id).ok_or(SetupError::UnknownLevel(id))?;
            (level.start_article.to_owned(), level.target_article.to_owned())
        }
        LevelChoice::Custom { start, target } => {
            let start = non_empty("start", &start)?;
            let target = non_empty("target", &target)?;
            (start, target)
        }
        LevelChoice::Random => {
            let start = random(source).await?;
            let target = random(source).await?;
            (start, target)
        }
    };

    load(source, &start_article).await?;
    load(source, &target_article).await?;

    tracing::info!(start = %start_article, target = %target_article, "race set up");
    Ok(RaceSetup {
        start_article,
        target_article,
    })
}

fn non_empty(which: &'static str, title: &str) -> Result<String, SetupError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(SetupError::EmptyTitle(which));
    }
    Ok(title.to_owned())
}

async fn random<S: ArticleSource>(source: &S) -> Result<String, SetupError> {
    source
        .fetch_random_title()
        .await
        .map_err(|source| SetupError::Article {
            title: "a random article".to_owned(),
            source,
        })
}

async fn load<S: ArticleSource>(source: &S, title: &str) -> Result<(), SetupError> {
    source
        .fetch_article_html(title)
        .await
        .map(|_| ())
        .map_err(|source| SetupError::Article {
            title: title.to_owned(),
            source,
        })
}
