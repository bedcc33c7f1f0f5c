//! The race state machine for a single room.
//!
//! `Room` is plain synchronous data. Every operation validates, mutates and
//! returns the events it produced as `(Recipient, ServerEvent)` pairs; it
//! never sends anything itself. The room actor owns one `Room` and turns
//! those pairs into channel sends, which keeps this module free of async
//! and lets tests pass explicit timestamps.

use wikirace_protocol::{
    GameStatus, PlayerId, Recipient, RoomCode, RoomSnapshot, ServerEvent, Standing,
};

use crate::{Player, RoomError};

/// Events produced by one room operation, in emission order.
pub type Outbound = Vec<(Recipient, ServerEvent)>;

/// A live room.
#[derive(Debug, Clone)]
pub struct Room {
    code: RoomCode,
    /// Join order.
    players: Vec<Player>,
    start_article: String,
    target_article: String,
    status: GameStatus,
    start_time: Option<u64>,
    max_players: usize,
    created_by: PlayerId,
}

impl Room {
    /// Opens a room in `Waiting` whose only member is its creator.
    pub fn new(
        code: RoomCode,
        creator: PlayerId,
        creator_name: String,
        start_article: String,
        target_article: String,
        max_players: usize,
    ) -> Self {
        let creator_player = Player::new(creator, creator_name, &start_article);
        Self {
            code,
            players: vec![creator_player],
            start_article,
            target_article,
            status: GameStatus::Waiting,
            start_time: None,
            max_players,
            created_by: creator,
        }
    }

    /// What the creator is told once the room exists.
    pub fn creation_events(&self) -> Outbound {
        let creator = Recipient::Player(self.created_by);
        vec![
            (
                creator,
                ServerEvent::RoomCreated {
                    room_id: self.code.clone(),
                    game_room: self.snapshot(),
                },
            ),
            (
                creator,
                ServerEvent::RoomUpdated {
                    game_room: self.snapshot(),
                },
            ),
        ]
    }

    /// Adds a player at the start article.
    ///
    /// Capacity is checked before status, so a full room reports
    /// `RoomFull` even after it has started.
    pub fn join(&mut self, player_id: PlayerId, name: String) -> Result<Outbound, RoomError> {
        if self.contains(player_id) {
            return Err(RoomError::AlreadyInRoom(self.code.clone()));
        }
        if self.players.len() >= self.max_players {
            return Err(RoomError::RoomFull(self.code.clone()));
        }
        if !self.status.is_joinable() {
            return Err(RoomError::GameAlreadyStarted(self.code.clone()));
        }

        self.players
            .push(Player::new(player_id, name, &self.start_article));

        let snapshot = self.snapshot();
        Ok(vec![
            (
                Recipient::Player(player_id),
                ServerEvent::RoomJoined {
                    game_room: snapshot.clone(),
                },
            ),
            (Recipient::All, ServerEvent::RoomUpdated { game_room: snapshot }),
        ])
    }

    /// Starts (or, while playing, restarts) the clock.
    ///
    /// Only the creator may start, and only while still a member. A
    /// restart resets `start_time` but keeps everyone's progress.
    pub fn start(&mut self, requester: PlayerId, now: u64) -> Result<Outbound, RoomError> {
        if requester != self.created_by || !self.contains(requester) {
            return Err(RoomError::Unauthorized(self.code.clone()));
        }
        if self.status == GameStatus::Finished {
            return Err(RoomError::GameFinished(self.code.clone()));
        }

        self.status = GameStatus::Playing;
        self.start_time = Some(now);

        Ok(vec![(
            Recipient::All,
            ServerEvent::GameStarted {
                game_room: self.snapshot(),
            },
        )])
    }

    /// Records a move. Returns nothing when the room isn't playing or the
    /// player isn't a member.
    ///
    /// Emission order: `player-finished` (first arrival only), then
    /// `game-finished` if that arrival completed the race, then
    /// `player-moved` for every accepted move.
    pub fn navigate(&mut self, player_id: PlayerId, article_title: String, now: u64) -> Outbound {
        if !self.status.accepts_moves() {
            return Vec::new();
        }
        let start_time = self.start_time.unwrap_or(now);
        let reached_target = article_title == self.target_article;

        let Some(player) = self.players.iter_mut().find(|p| p.id == player_id) else {
            return Vec::new();
        };

        player.path.push(article_title.clone());
        player.time_taken = now.saturating_sub(start_time) / 1000;

        let mut events = Vec::new();
        if reached_target && !player.is_finished() {
            player.finish_time = Some(now);
            events.push((
                Recipient::All,
                ServerEvent::PlayerFinished {
                    player_id,
                    player_name: player.name.clone(),
                    time_taken: player.time_taken,
                    path_length: player.path.len(),
                },
            ));

            if self.players.iter().all(Player::is_finished) {
                self.status = GameStatus::Finished;
                events.push((
                    Recipient::All,
                    ServerEvent::GameFinished {
                        game_room: self.snapshot(),
                    },
                ));
            }
        }

        // Re-borrow: the snapshot above needed all of `self`.
        if let Some(player) = self.player(player_id) {
            events.push((
                Recipient::All,
                ServerEvent::PlayerMoved {
                    player_id,
                    article_title,
                    path_length: player.path.len(),
                    time_taken: player.time_taken,
                },
            ));
        }
        events
    }

    /// Removes a member. The remaining members get `player-left` followed
    /// by `room-updated`; when nobody remains the list is empty.
    ///
    /// The creator's privilege is never handed over.
    pub fn leave(&mut self, player_id: PlayerId) -> Result<Outbound, RoomError> {
        let index = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or_else(|| RoomError::NotInRoom(self.code.clone()))?;
        self.players.remove(index);

        if self.players.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![
            (Recipient::All, ServerEvent::PlayerLeft { player_id }),
            (
                Recipient::All,
                ServerEvent::RoomUpdated {
                    game_room: self.snapshot(),
                },
            ),
        ])
    }

    /// Full wire snapshot, players in join order.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.code.clone(),
            players: self.players.iter().map(Player::snapshot).collect(),
            start_article: self.start_article.clone(),
            target_article: self.target_article.clone(),
            game_status: self.status,
            start_time: self.start_time,
            max_players: self.max_players,
            created_by: self.created_by,
        }
    }

    /// Current leaderboard; `Standing::index` points into [`Room::players`].
    pub fn standings(&self) -> Vec<Standing> {
        let keys: Vec<_> = self
            .players
            .iter()
            .map(|p| wikirace_protocol::RankKey {
                finish_time: p.finish_time,
                path_length: p.path.len(),
            })
            .collect();
        wikirace_protocol::standings::standings(&keys)
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn created_by(&self) -> PlayerId {
        self.created_by
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.player(player_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
