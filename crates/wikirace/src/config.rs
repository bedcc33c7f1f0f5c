//! Server configuration.
//!
//! Defaults suit local development. Deployments override them through
//! environment variables:
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `WIKIRACE_BIND` | listen address | `127.0.0.1:8080` |
//! | `WIKIRACE_IDLE_TIMEOUT_SECS` | close silent connections after | `120` |
//! | `WIKIRACE_MAX_PLAYERS_LIMIT` | largest room capacity | `8` |
//! | `WIKIRACE_CODE_LENGTH` | room code length | `6` |

use std::str::FromStr;
use std::time::Duration;

use wikirace_room::{MIN_PLAYERS, RoomConfig};

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set but could not be used.
    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the server needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// A connection that sends nothing for this long is closed.
    pub idle_timeout: Duration,

    /// Settings for every room.
    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            idle_timeout: Duration::from_secs(120),
            room: RoomConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value. Unset variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(bind) = lookup("WIKIRACE_BIND") {
            if bind.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    var: "WIKIRACE_BIND",
                    value: bind,
                    reason: "must not be empty".into(),
                });
            }
            config.bind_addr = bind.trim().to_string();
        }

        if let Some(secs) = parse::<u64>(&lookup, "WIKIRACE_IDLE_TIMEOUT_SECS")? {
            if secs == 0 {
                return Err(invalid("WIKIRACE_IDLE_TIMEOUT_SECS", secs, "must be positive"));
            }
            config.idle_timeout = Duration::from_secs(secs);
        }

        if let Some(limit) = parse::<usize>(&lookup, "WIKIRACE_MAX_PLAYERS_LIMIT")? {
            if limit < MIN_PLAYERS {
                return Err(invalid(
                    "WIKIRACE_MAX_PLAYERS_LIMIT",
                    limit,
                    &format!("must be at least {MIN_PLAYERS}"),
                ));
            }
            config.room.max_players_limit = limit;
            config.room.default_max_players = config.room.default_max_players.min(limit);
        }

        if let Some(len) = parse::<usize>(&lookup, "WIKIRACE_CODE_LENGTH")? {
            if !(4..=16).contains(&len) {
                return Err(invalid("WIKIRACE_CODE_LENGTH", len, "must be between 4 and 16"));
            }
            config.room.code_length = len;
        }

        Ok(config)
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(var)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                value: raw.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn invalid(var: &'static str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
