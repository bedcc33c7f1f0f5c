//! Room actor: an isolated Tokio task that owns one [`Room`].
//!
//! Each room runs in its own task and is reached only through an mpsc
//! channel, so every mutation of a room (including disconnect cleanup) is
//! applied one at a time in arrival order, while different rooms progress
//! in parallel.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{mpsc, oneshot};
use wikirace_protocol::{PlayerId, Recipient, RoomCode, RoomSnapshot, ServerEvent, clock};

use crate::room::Outbound;
use crate::{Room, RoomError};

/// Channel sender for delivering events to one player's connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in each variant is the reply channel: the caller
/// sends a command and waits for the outcome on it.
enum RoomCommand {
    Join {
        player_id: PlayerId,
        player_name: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<RoomSnapshot, RoomError>>,
    },

    Start {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    Navigate {
        player_id: PlayerId,
        article_title: String,
        reply: oneshot::Sender<()>,
    },

    /// Replies with the number of members left.
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<usize, RoomError>>,
    },

    Snapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },
}

/// Handle to a running room actor.
///
/// Cheap to clone: an `mpsc::Sender` plus a shared member counter. Once
/// the room's last member leaves the actor stops, and every later call
/// through any handle fails with [`RoomError::NotFound`].
#[derive(Debug, Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
    members: Arc<AtomicUsize>,
}

impl RoomHandle {
    /// The room's code.
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Members as of the actor's last processed command. Zero means the
    /// actor has stopped or is about to.
    pub fn member_count(&self) -> usize {
        self.members.load(Ordering::Acquire)
    }

    /// Adds a player; on success returns the snapshot that includes them.
    pub async fn join(
        &self,
        player_id: PlayerId,
        player_name: String,
        sender: PlayerSender,
    ) -> Result<RoomSnapshot, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            player_id,
            player_name,
            sender,
            reply,
        })
        .await?;
        rx.await.map_err(|_| self.gone())?
    }

    /// Asks the room to start its race on behalf of `player_id`.
    pub async fn start(&self, player_id: PlayerId) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Start { player_id, reply }).await?;
        rx.await.map_err(|_| self.gone())?
    }

    /// Submits a move. Resolves once the room has applied (or ignored) it.
    pub async fn navigate(&self, player_id: PlayerId, article_title: String) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Navigate {
            player_id,
            article_title,
            reply,
        })
        .await?;
        rx.await.map_err(|_| self.gone())
    }

    /// Removes a member and returns how many remain.
    pub async fn leave(&self, player_id: PlayerId) -> Result<usize, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Leave { player_id, reply }).await?;
        rx.await.map_err(|_| self.gone())?
    }

    /// Current room state.
    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Snapshot { reply }).await?;
        rx.await.map_err(|_| self.gone())
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender.send(cmd).await.map_err(|_| self.gone())
    }

    fn gone(&self) -> RoomError {
        RoomError::NotFound(self.code.clone())
    }
}

/// The actor's private state. Runs inside a Tokio task.
struct RoomActor {
    room: Room,
    /// Per-member outbound channels.
    senders: HashMap<PlayerId, PlayerSender>,
    members: Arc<AtomicUsize>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs until the room empties or every handle is dropped.
    async fn run(mut self) {
        let room_id = self.room.code().clone();
        tracing::info!(%room_id, host = %self.room.created_by(), "room actor started");

        self.dispatch(self.room.creation_events());

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player_id,
                    player_name,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player_id, player_name, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Start { player_id, reply } => {
                    let result = self.handle_start(player_id);
                    let _ = reply.send(result);
                }
                RoomCommand::Navigate {
                    player_id,
                    article_title,
                    reply,
                } => {
                    self.handle_navigate(player_id, article_title);
                    let _ = reply.send(());
                }
                RoomCommand::Leave { player_id, reply } => {
                    let result = self.handle_leave(player_id);
                    let _ = reply.send(result);
                }
                RoomCommand::Snapshot { reply } => {
                    let _ = reply.send(self.room.snapshot());
                }
            }

            if self.room.is_empty() {
                break;
            }
        }

        tracing::info!(%room_id, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        player_name: String,
        sender: PlayerSender,
    ) -> Result<RoomSnapshot, RoomError> {
        let events = self.room.join(player_id, player_name)?;
        self.senders.insert(player_id, sender);
        self.sync_members();
        tracing::info!(
            room_id = %self.room.code(),
            %player_id,
            players = self.room.len(),
            "player joined"
        );
        self.dispatch(events);
        Ok(self.room.snapshot())
    }

    fn handle_start(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        let events = self.room.start(player_id, clock::now_millis())?;
        tracing::info!(
            room_id = %self.room.code(),
            players = self.room.len(),
            "game started"
        );
        self.dispatch(events);
        Ok(())
    }

    fn handle_navigate(&mut self, player_id: PlayerId, article_title: String) {
        let events = self.room.navigate(player_id, article_title, clock::now_millis());
        if events.is_empty() {
            tracing::debug!(
                room_id = %self.room.code(),
                %player_id,
                status = %self.room.status(),
                "navigation ignored"
            );
            return;
        }
        for (_, event) in &events {
            match event {
                ServerEvent::PlayerFinished {
                    time_taken,
                    path_length,
                    ..
                } => tracing::info!(
                    room_id = %self.room.code(),
                    %player_id,
                    time_taken,
                    path_length,
                    "player finished"
                ),
                ServerEvent::GameFinished { .. } => {
                    tracing::info!(room_id = %self.room.code(), "game finished")
                }
                _ => {}
            }
        }
        self.dispatch(events);
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> Result<usize, RoomError> {
        let events = self.room.leave(player_id)?;
        self.senders.remove(&player_id);
        self.sync_members();
        tracing::info!(
            room_id = %self.room.code(),
            %player_id,
            players = self.room.len(),
            "player left"
        );
        self.dispatch(events);
        Ok(self.room.len())
    }

    fn sync_members(&self) {
        self.members.store(self.room.len(), Ordering::Release);
    }

    /// Resolves recipients against the current member list and sends.
    fn dispatch(&self, events: Outbound) {
        for (recipient, event) in events {
            match recipient {
                Recipient::All => {
                    for pid in self.senders.keys() {
                        self.send_to(*pid, event.clone());
                    }
                }
                Recipient::Player(pid) => self.send_to(pid, event),
            }
        }
    }

    /// Drops the event if the player's connection is already gone.
    fn send_to(&self, player_id: PlayerId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(event);
        }
    }
}

/// Spawns an actor for `room`, whose creator receives events on
/// `creator_sender`, and returns a handle to it.
///
/// `channel_size` bounds the command queue; when it fills up, callers wait.
pub(crate) fn spawn_room(room: Room, creator_sender: PlayerSender, channel_size: usize) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let code = room.code().clone();
    let members = Arc::new(AtomicUsize::new(room.len()));

    let mut senders = HashMap::new();
    senders.insert(room.created_by(), creator_sender);

    let actor = RoomActor {
        room,
        senders,
        members: Arc::clone(&members),
        receiver: rx,
    };
    tokio::spawn(actor.run());

    RoomHandle {
        code,
        sender: tx,
        members,
    }
}
