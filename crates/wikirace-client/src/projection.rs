//! The client's local view of its room.
//!
//! `ClientView::apply` is a pure function of the previous view, one event
//! and the local time the event arrived. Snapshot-bearing events replace
//! the room wholesale; the incremental events (`player-moved`,
//! `player-finished`, `player-left`) patch it in place between snapshots.

use std::collections::HashMap;

use wikirace_protocol::{PlayerId, PlayerSnapshot, RankKey, RoomSnapshot, ServerEvent, standings};

/// What a client knows about its room.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientView {
    player_id: Option<PlayerId>,
    room: Option<RoomSnapshot>,
    /// Receipt of each `player-finished`. The time is for display only;
    /// ranking uses the arrival order.
    local_finishes: HashMap<PlayerId, LocalFinish>,
    next_arrival: u64,
    last_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LocalFinish {
    received_at: u64,
    arrival: u64,
}

/// One leaderboard line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandingRow<'a> {
    pub player: &'a PlayerSnapshot,
    /// `None` while the player is still racing.
    pub rank: Option<usize>,
}

impl ClientView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one server event into the view.
    pub fn apply(mut self, event: &ServerEvent, received_at: u64) -> Self {
        match event {
            ServerEvent::Connected { player_id } => {
                self.player_id = Some(*player_id);
            }
            ServerEvent::RoomCreated { game_room, .. }
            | ServerEvent::RoomJoined { game_room }
            | ServerEvent::RoomUpdated { game_room }
            | ServerEvent::GameStarted { game_room }
            | ServerEvent::GameFinished { game_room } => {
                if self.room.as_ref().is_some_and(|r| r.id != game_room.id) {
                    self.local_finishes.clear();
                }
                self.room = Some(game_room.clone());
                self.last_error = None;
            }
            ServerEvent::PlayerMoved {
                player_id,
                article_title,
                path_length,
                time_taken,
            } => {
                if let Some(player) = self.player_mut(*player_id) {
                    player.path.truncate(path_length.saturating_sub(1));
                    player.path.push(article_title.clone());
                    player.current_article = article_title.clone();
                    player.time_taken = *time_taken;
                }
            }
            ServerEvent::PlayerFinished {
                player_id,
                time_taken,
                ..
            } => {
                if let Some(player) = self.player_mut(*player_id) {
                    player.is_finished = true;
                    player.time_taken = *time_taken;
                    let arrival = self.next_arrival;
                    let entry = self.local_finishes.entry(*player_id).or_insert(LocalFinish {
                        received_at,
                        arrival,
                    });
                    if entry.arrival == arrival {
                        self.next_arrival += 1;
                    }
                }
            }
            ServerEvent::PlayerLeft { player_id } => {
                if let Some(room) = self.room.as_mut() {
                    room.players.retain(|p| p.id != *player_id);
                }
                self.local_finishes.remove(player_id);
            }
            ServerEvent::Error { message } => {
                self.last_error = Some(message.clone());
            }
            ServerEvent::Pong { .. } => {}
        }
        self
    }

    /// Forgets the room after this client left it.
    pub fn leave(mut self) -> Self {
        self.room = None;
        self.local_finishes.clear();
        self
    }

    /// The id the server assigned this connection.
    pub fn player_id(&self) -> Option<PlayerId> {
        self.player_id
    }

    pub fn room(&self) -> Option<&RoomSnapshot> {
        self.room.as_ref()
    }

    /// This client's own entry in the room.
    pub fn current_player(&self) -> Option<&PlayerSnapshot> {
        let id = self.player_id?;
        self.room.as_ref()?.player(id)
    }

    /// `true` if this client created the room.
    pub fn is_host(&self) -> bool {
        matches!((self.player_id, &self.room), (Some(id), Some(room)) if room.created_by == id)
    }

    /// The most recent `error` message, cleared by the next snapshot.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// When this client saw `player_id` finish, if it did.
    pub fn local_finish_time(&self, player_id: PlayerId) -> Option<u64> {
        self.local_finishes.get(&player_id).map(|f| f.received_at)
    }

    /// Leaderboard, best first.
    ///
    /// Players whose finish time came from the server are ordered by it.
    /// A player whose finish is only known from a `player-finished` event
    /// finished after every finish in the last snapshot, so they follow,
    /// in the order the events arrived. Server and local clocks are never
    /// compared.
    pub fn standings(&self) -> Vec<StandingRow<'_>> {
        let Some(room) = &self.room else {
            return Vec::new();
        };

        let mut server_finished: Vec<(u64, usize)> = Vec::new();
        let mut local_finished: Vec<(u64, usize)> = Vec::new();
        for (index, p) in room.players.iter().enumerate() {
            match (p.finish_time, self.local_finishes.get(&p.id)) {
                (Some(at), _) => server_finished.push((at, index)),
                (None, Some(local)) if p.is_finished => local_finished.push((local.arrival, index)),
                _ => {}
            }
        }
        server_finished.sort();
        local_finished.sort();

        // Finish order becomes a single ordinal the shared ranking can sort by.
        let mut finish_order: Vec<Option<u64>> = vec![None; room.players.len()];
        for (ordinal, (_, index)) in server_finished.iter().chain(&local_finished).enumerate() {
            finish_order[*index] = Some(ordinal as u64);
        }

        let keys: Vec<RankKey> = room
            .players
            .iter()
            .zip(finish_order)
            .map(|(p, finish_time)| RankKey {
                finish_time,
                path_length: p.path.len(),
            })
            .collect();

        standings::standings(&keys)
            .into_iter()
            .map(|s| StandingRow {
                player: &room.players[s.index],
                rank: s.rank,
            })
            .collect()
    }

    fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerSnapshot> {
        self.room
            .as_mut()?
            .players
            .iter_mut()
            .find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use wikirace_protocol::{GameStatus, RoomCode};

    use super::*;

    const ME: PlayerId = PlayerId(1);
    const BOB: PlayerId = PlayerId(2);

    fn racer(id: PlayerId, name: &str) -> PlayerSnapshot {
        PlayerSnapshot {
            id,
            name: name.into(),
            current_article: "Dog".into(),
            path: vec!["Dog".into()],
            time_taken: 0,
            is_finished: false,
            finish_time: None,
        }
    }

    fn room(status: GameStatus) -> RoomSnapshot {
        RoomSnapshot {
            id: RoomCode::from("ABC123"),
            players: vec![racer(ME, "Ada"), racer(BOB, "Bob")],
            start_article: "Dog".into(),
            target_article: "Canidae".into(),
            game_status: status,
            start_time: Some(0),
            max_players: 4,
            created_by: ME,
        }
    }

    fn playing_view() -> ClientView {
        ClientView::new()
            .apply(&ServerEvent::Connected { player_id: ME }, 0)
            .apply(
                &ServerEvent::GameStarted {
                    game_room: room(GameStatus::Playing),
                },
                0,
            )
    }

    fn moved(player_id: PlayerId, title: &str, path_length: usize) -> ServerEvent {
        ServerEvent::PlayerMoved {
            player_id,
            article_title: title.into(),
            path_length,
            time_taken: 3,
        }
    }

    fn finished(player_id: PlayerId) -> ServerEvent {
        ServerEvent::PlayerFinished {
            player_id,
            player_name: String::new(),
            time_taken: 7,
            path_length: 2,
        }
    }

    #[test]
    fn test_connected_then_snapshot_identifies_current_player() {
        let view = playing_view();

        assert_eq!(view.player_id(), Some(ME));
        assert_eq!(view.current_player().unwrap().name, "Ada");
        assert!(view.is_host());
    }

    #[test]
    fn test_player_moved_appends_to_path() {
        let view = playing_view().apply(&moved(BOB, "Canine", 2), 10);

        let bob = view.room().unwrap().player(BOB).unwrap();
        assert_eq!(bob.path, vec!["Dog", "Canine"]);
        assert_eq!(bob.current_article, "Canine");
        assert_eq!(bob.time_taken, 3);
    }

    #[test]
    fn test_player_moved_truncates_to_server_length() {
        // A stale local path (an extra entry) is cut back before appending.
        let view = playing_view()
            .apply(&moved(BOB, "Canine", 2), 10)
            .apply(&moved(BOB, "Wolf", 3), 11)
            .apply(&moved(BOB, "Fox", 3), 12);

        let bob = view.room().unwrap().player(BOB).unwrap();
        assert_eq!(bob.path, vec!["Dog", "Canine", "Fox"]);
    }

    #[test]
    fn test_player_moved_for_unknown_player_is_ignored() {
        let before = playing_view();
        let after = before.clone().apply(&moved(PlayerId(9), "Wolf", 2), 10);
        assert_eq!(before, after);
    }

    #[test]
    fn test_player_finished_stamps_local_time_once() {
        let view = playing_view()
            .apply(&finished(BOB), 500)
            .apply(&finished(BOB), 900);

        let bob = view.room().unwrap().player(BOB).unwrap();
        assert!(bob.is_finished);
        assert_eq!(bob.finish_time, None);
        assert_eq!(view.local_finish_time(BOB), Some(500));
    }

    #[test]
    fn test_standings_use_local_stamp_until_snapshot() {
        let view = playing_view().apply(&finished(BOB), 500);

        let rows: Vec<_> = view.standings().iter().map(|r| (r.player.id, r.rank)).collect();
        assert_eq!(rows, vec![(BOB, Some(1)), (ME, None)]);
    }

    #[test]
    fn test_standings_prefer_server_finish_time() {
        // Local stamps say Bob finished first; the server says Ada did.
        let mut final_room = room(GameStatus::Finished);
        for p in &mut final_room.players {
            p.is_finished = true;
        }
        final_room.players[0].finish_time = Some(1_000);
        final_room.players[1].finish_time = Some(2_000);

        let view = playing_view()
            .apply(&finished(BOB), 100)
            .apply(&finished(ME), 200)
            .apply(&ServerEvent::GameFinished { game_room: final_room }, 300);

        let order: Vec<_> = view.standings().iter().map(|r| r.player.id).collect();
        assert_eq!(order, vec![ME, BOB]);
        assert_eq!(view.local_finish_time(BOB), Some(100));
    }

    #[test]
    fn test_standings_never_mix_server_and_local_clocks() {
        // Bob's finish is in a snapshot, on the server clock. Ada's finish
        // arrives later, stamped by a client clock that runs far behind.
        let mut mid_race = room(GameStatus::Playing);
        mid_race.players[1].is_finished = true;
        mid_race.players[1].finish_time = Some(1_000_000);

        let view = playing_view()
            .apply(&ServerEvent::RoomUpdated { game_room: mid_race }, 900_000)
            .apply(&finished(ME), 500_000);

        let rows: Vec<_> = view.standings().iter().map(|r| (r.player.id, r.rank)).collect();
        assert_eq!(rows, vec![(BOB, Some(1)), (ME, Some(2))]);
        assert_eq!(view.local_finish_time(ME), Some(500_000));
    }

    #[test]
    fn test_standings_local_finishes_follow_arrival_order() {
        let mut three = room(GameStatus::Playing);
        three.players.push(racer(PlayerId(3), "Cy"));
        let view = ClientView::new()
            .apply(&ServerEvent::Connected { player_id: ME }, 0)
            .apply(&ServerEvent::GameStarted { game_room: three }, 0)
            // Receipt stamps go backwards; arrival order still wins.
            .apply(&finished(PlayerId(3)), 900)
            .apply(&finished(ME), 100);

        let order: Vec<_> = view.standings().iter().map(|r| r.player.id).collect();
        assert_eq!(order, vec![PlayerId(3), ME, BOB]);
    }

    #[test]
    fn test_player_left_removes_player() {
        let view = playing_view()
            .apply(&finished(BOB), 100)
            .apply(&ServerEvent::PlayerLeft { player_id: BOB }, 200);

        assert!(view.room().unwrap().player(BOB).is_none());
        assert_eq!(view.local_finish_time(BOB), None);
    }

    #[test]
    fn test_error_is_kept_until_next_snapshot() {
        let view = playing_view().apply(
            &ServerEvent::Error {
                message: "Room is full".into(),
            },
            0,
        );
        assert_eq!(view.last_error(), Some("Room is full"));

        let view = view.apply(
            &ServerEvent::RoomUpdated {
                game_room: room(GameStatus::Playing),
            },
            0,
        );
        assert_eq!(view.last_error(), None);
    }

    #[test]
    fn test_leave_clears_room() {
        let view = playing_view().leave();
        assert!(view.room().is_none());
        assert!(view.current_player().is_none());
        assert!(view.standings().is_empty());
        assert_eq!(view.player_id(), Some(ME));
    }
}
