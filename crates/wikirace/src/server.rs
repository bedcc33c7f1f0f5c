//! `WikiraceServer` builder and accept loop.
//!
//! This is the entry point for running a race server. It ties the layers
//! together: transport → protocol → session → room.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use wikirace_protocol::JsonCodec;
use wikirace_room::{RoomConfig, RoomRegistry};
use wikirace_session::SessionManager;
use wikirace_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{ServerConfig, WikiraceError};

/// Shared server state handed to each connection task.
///
/// The session lock is only ever held for synchronous bookkeeping. The
/// registry does its own locking.
pub(crate) struct ServerState {
    pub(crate) sessions: Mutex<SessionManager>,
    pub(crate) rooms: Arc<RoomRegistry>,
    pub(crate) codec: JsonCodec,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a server.
///
/// # Example
///
/// ```rust,ignore
/// let server = WikiraceServer::builder()
///     .bind("0.0.0.0:8080")
///     .idle_timeout(Duration::from_secs(60))
///     .build()
///     .await?;
/// server.run().await
/// ```
#[derive(Debug, Clone, Default)]
pub struct WikiraceServerBuilder {
    config: ServerConfig,
}

impl WikiraceServerBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every setting at once, e.g. with [`ServerConfig::from_env`].
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind to. Port `0` picks a free port.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Closes connections that stay silent for `timeout`.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Sets code length and capacity limits for new rooms.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.config.room = config;
        self
    }

    /// Binds the listener. The server accepts nothing until
    /// [`run`](WikiraceServer::run) is called.
    pub async fn build(self) -> Result<WikiraceServer, WikiraceError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let state = Arc::new(ServerState {
            sessions: Mutex::new(SessionManager::new()),
            rooms: Arc::new(RoomRegistry::new(self.config.room.clone())),
            codec: JsonCodec,
            idle_timeout: self.config.idle_timeout,
        });

        Ok(WikiraceServer { transport, state })
    }
}

/// A bound race server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct WikiraceServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl WikiraceServer {
    /// Creates a new builder.
    pub fn builder() -> WikiraceServerBuilder {
        WikiraceServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The live room registry, for inspection while the server runs.
    pub fn rooms(&self) -> Arc<RoomRegistry> {
        Arc::clone(&self.state.rooms)
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), WikiraceError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `shutdown` completes.
    ///
    /// Connections already accepted keep running on their own tasks.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), WikiraceError> {
        tracing::info!(addr = ?self.local_addr().ok(), "wikirace server running");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("shutdown requested, no longer accepting");
                    return Ok(());
                }
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
            }
        }
    }
}
