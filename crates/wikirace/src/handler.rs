//! Per-connection handler: greeting, request routing and cleanup.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register a session and push `connected{playerId}`
//!   2. Loop: receive a frame → decode → dispatch to the room registry
//!   3. On close, error or idle timeout: leave the bound room, drop the session
//!
//! Outbound events never go straight to the socket. The handler and every
//! room the player is in push onto one unbounded channel, drained by a
//! writer task, so a room actor never waits on a slow client.

use std::sync::Arc;

use tokio::sync::mpsc;
use wikirace_protocol::{ClientMessage, Codec, PlayerId, RoomCode, ServerEvent, clock};
use wikirace_room::{NewRoom, PlayerSender, RoomError};
use wikirace_transport::{Connection, WebSocketConnection};

use crate::WikiraceError;
use crate::server::ServerState;

/// Drop guard that runs disconnect cleanup when the handler exits.
///
/// Cleanup happens even if the handler panics. `Drop` is synchronous, so
/// the async part runs on a spawned task: the session goes first, then the
/// player leaves whatever room the session was bound to.
struct SessionGuard {
    player_id: PlayerId,
    state: Arc<ServerState>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let room = match state.sessions.lock().await.disconnect(player_id) {
                Ok(room) => room,
                Err(e) => {
                    tracing::debug!(%player_id, error = %e, "no session to remove");
                    return;
                }
            };
            if let Some(code) = room {
                if let Err(e) = state.rooms.leave(&code, player_id).await {
                    tracing::debug!(%player_id, room_id = %code, error = %e, "leave on disconnect failed");
                }
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), WikiraceError> {
    let conn = Arc::new(conn);
    let player_id = PlayerId::from(conn.id());
    tracing::info!(%player_id, peer = %conn.peer_addr(), "connection accepted");

    // If session creation fails no guard is needed; once it succeeds the
    // guard is active immediately.
    {
        let mut sessions = state.sessions.lock().await;
        sessions.create(player_id)?;
    }
    let _guard = SessionGuard {
        player_id,
        state: Arc::clone(&state),
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_events(Arc::clone(&conn), rx, state.codec, player_id));
    push(&tx, ServerEvent::Connected { player_id });

    loop {
        let data = match tokio::time::timeout(state.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(%player_id, "connection idle, closing");
                break;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "failed to decode request");
                push(
                    &tx,
                    ServerEvent::Error {
                        message: format!("Invalid message: {e}"),
                    },
                );
                continue;
            }
        };

        if let Err(e) = dispatch(&state, player_id, &tx, msg).await {
            tracing::debug!(%player_id, error = %e, "request rejected");
            push(
                &tx,
                ServerEvent::Error {
                    message: e.to_string(),
                },
            );
        }
    }

    writer.abort();
    if let Err(e) = conn.close().await {
        tracing::debug!(%player_id, error = %e, "close failed");
    }
    // _guard drops here → room leave and session removal fire.
    Ok(())
}

/// Routes one decoded request.
///
/// Every `Err` becomes a single `error` event to the requester. Success
/// events are emitted by the room actors, not here.
async fn dispatch(
    state: &ServerState,
    player_id: PlayerId,
    tx: &PlayerSender,
    msg: ClientMessage,
) -> Result<(), WikiraceError> {
    match msg {
        ClientMessage::CreateRoom {
            player_name,
            start_article,
            target_article,
            max_players,
        } => {
            ensure_unbound(state, player_id).await?;
            let request = NewRoom {
                player_name,
                start_article,
                target_article,
                max_players: max_players.unwrap_or(state.rooms.config().default_max_players),
            };
            let room = state.rooms.create_room(player_id, tx.clone(), request).await?;
            bind(state, player_id, room.id).await?;
        }

        ClientMessage::JoinRoom {
            room_id,
            player_name,
        } => {
            ensure_unbound(state, player_id).await?;
            let room = state
                .rooms
                .join(&room_id, player_id, &player_name, tx.clone())
                .await?;
            bind(state, player_id, room.id).await?;
        }

        ClientMessage::StartGame { room_id } => {
            state.rooms.start(&room_id, player_id).await?;
        }

        ClientMessage::NavigateArticle {
            room_id,
            article_title,
        } => match state.rooms.navigate(&room_id, player_id, &article_title).await {
            // Moves for a room that no longer exists are dropped like any
            // other move outside a running race.
            Err(RoomError::NotFound(code)) => {
                tracing::debug!(%player_id, room_id = %code, "move for unknown room ignored");
            }
            other => other?,
        },

        ClientMessage::LeaveRoom { room_id } => {
            let bound = state.sessions.lock().await.room_of(player_id);
            if bound.as_ref() != Some(&room_id) {
                return Err(RoomError::NotInRoom(room_id).into());
            }
            state.sessions.lock().await.unbind(player_id)?;
            match state.rooms.leave(&room_id, player_id).await {
                Err(RoomError::NotFound(_)) => {}
                other => other?,
            }
        }

        ClientMessage::Ping { client_time } => {
            push(
                tx,
                ServerEvent::Pong {
                    client_time,
                    server_time: clock::now_millis(),
                },
            );
        }
    }
    Ok(())
}

/// Rejects create/join from a connection that is already in a room.
async fn ensure_unbound(state: &ServerState, player_id: PlayerId) -> Result<(), RoomError> {
    match state.sessions.lock().await.room_of(player_id) {
        Some(code) => Err(RoomError::AlreadyInRoom(code)),
        None => Ok(()),
    }
}

/// Records the room in the player's session. If that fails the player is
/// taken back out of the room so no membership exists without a binding.
async fn bind(state: &ServerState, player_id: PlayerId, code: RoomCode) -> Result<(), WikiraceError> {
    let bound = state.sessions.lock().await.bind(player_id, code.clone());
    if let Err(e) = bound {
        let _ = state.rooms.leave(&code, player_id).await;
        return Err(e.into());
    }
    Ok(())
}

/// Queues an event for the writer. A closed channel means the writer has
/// already stopped, and the read loop will notice the dead socket next.
fn push(tx: &PlayerSender, event: ServerEvent) {
    if tx.send(event).is_err() {
        tracing::trace!("writer gone, event dropped");
    }
}

/// Drains the player's event queue onto the socket.
async fn write_events(
    conn: Arc<WebSocketConnection>,
    mut rx: mpsc::UnboundedReceiver<ServerEvent>,
    codec: impl Codec,
    player_id: PlayerId,
) {
    while let Some(event) = rx.recv().await {
        let bytes = match codec.encode(&event) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(%player_id, event = event.name(), error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%player_id, error = %e, "send failed, writer stopping");
            break;
        }
    }
}
