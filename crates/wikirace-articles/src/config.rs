//! Wikipedia client settings.

use std::time::Duration;

/// Where and how to reach the MediaWiki API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikipediaConfig {
    /// Full URL of `api.php`.
    pub api_url: String,

    /// Sent on every request. Wikimedia asks for a descriptive agent.
    pub user_agent: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            api_url: "https://en.wikipedia.org/w/api.php".to_owned(),
            user_agent: concat!("wikirace/", env!("CARGO_PKG_VERSION")).to_owned(),
            timeout: Duration::from_secs(10),
        }
    }
}
