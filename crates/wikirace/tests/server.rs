//! End-to-end tests: real WebSocket clients against a server on a random port.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use wikirace::prelude::*;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

const WAIT: Duration = Duration::from_secs(2);

/// Starts a server on a random port and returns its URL and registry.
async fn start_server_with(builder: WikiraceServerBuilder) -> (String, Arc<RoomRegistry>) {
    let server = builder
        .bind("127.0.0.1:0")
        .build()
        .await
        .expect("server should build");

    let url = format!("ws://{}", server.local_addr().expect("should have local addr"));
    let rooms = server.rooms();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    (url, rooms)
}

async fn start_server() -> (String, Arc<RoomRegistry>) {
    start_server_with(WikiraceServer::builder()).await
}

async fn client(url: &str) -> RaceClient {
    let mut client = RaceClient::connect(url).await.expect("should connect");
    expect_event(&mut client, "connected").await;
    client
}

/// Waits for the next event named `name`, skipping others.
async fn expect_event(client: &mut RaceClient, name: &str) -> ServerEvent {
    tokio::time::timeout(WAIT, client.recv_until(name))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {name}"))
        .expect("recv should succeed")
        .unwrap_or_else(|| panic!("connection closed before {name}"))
}

async fn expect_error(client: &mut RaceClient) -> String {
    match expect_event(client, "error").await {
        ServerEvent::Error { message } => message,
        other => panic!("expected error, got {other:?}"),
    }
}

/// Creates a Dog → Canidae room and returns its code.
async fn host(client: &mut RaceClient, name: &str, max_players: Option<usize>) -> RoomCode {
    client
        .create_room(name, "Dog", "Canidae", max_players)
        .await
        .unwrap();
    let room_id = match expect_event(client, "room-created").await {
        ServerEvent::RoomCreated { room_id, .. } => room_id,
        other => panic!("expected room-created, got {other:?}"),
    };
    expect_event(client, "room-updated").await;
    room_id
}

async fn join(client: &mut RaceClient, room_id: &RoomCode, name: &str) {
    client.join_room(room_id.as_str(), name).await.unwrap();
    expect_event(client, "room-joined").await;
    expect_event(client, "room-updated").await;
}

async fn raw(url: &str) -> ClientWs {
    let (mut ws, _) = tokio_tungstenite::connect_async(url)
        .await
        .expect("should connect");
    let greeting = next_event(&mut ws).await;
    assert!(matches!(greeting, ServerEvent::Connected { .. }));
    ws
}

async fn next_event(ws: &mut ClientWs) -> ServerEvent {
    let msg = tokio::time::timeout(WAIT, ws.next())
        .await
        .expect("timed out")
        .expect("stream ended")
        .expect("recv");
    serde_json::from_slice(&msg.into_data()).expect("decode")
}

/// Polls until the registry holds `count` rooms.
async fn wait_for_room_count(rooms: &RoomRegistry, count: usize) {
    tokio::time::timeout(WAIT, async {
        while rooms.room_count().await != count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("registry never reached {count} rooms"));
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_connected_carries_player_id() {
    let (url, _) = start_server().await;
    let a = client(&url).await;
    let b = client(&url).await;

    let a_id = a.view().player_id().unwrap();
    let b_id = b.view().player_id().unwrap();
    assert_ne!(a_id, b_id);
}

#[tokio::test]
async fn test_dog_to_canidae_race() {
    let (url, rooms) = start_server().await;
    let mut ada = client(&url).await;
    let mut bob = client(&url).await;

    let room_id = host(&mut ada, "Ada", Some(2)).await;
    assert!(ada.view().is_host());

    join(&mut bob, &room_id, "Bob").await;
    match expect_event(&mut ada, "room-updated").await {
        ServerEvent::RoomUpdated { game_room } => {
            let names: Vec<_> = game_room.players.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(names, vec!["Ada", "Bob"]);
        }
        other => panic!("expected room-updated, got {other:?}"),
    }

    ada.start_game().await.unwrap();
    expect_event(&mut ada, "game-started").await;
    expect_event(&mut bob, "game-started").await;

    bob.navigate("Canine").await.unwrap();
    bob.navigate("Canidae").await.unwrap();
    match expect_event(&mut bob, "player-finished").await {
        ServerEvent::PlayerFinished {
            player_name,
            path_length,
            ..
        } => {
            assert_eq!(player_name, "Bob");
            assert_eq!(path_length, 3);
        }
        other => panic!("expected player-finished, got {other:?}"),
    }

    // Distinct finish stamps keep the ranking unambiguous.
    tokio::time::sleep(Duration::from_millis(5)).await;
    ada.navigate("Canidae").await.unwrap();

    let final_room = match expect_event(&mut ada, "game-finished").await {
        ServerEvent::GameFinished { game_room } => game_room,
        other => panic!("expected game-finished, got {other:?}"),
    };
    assert_eq!(final_room.game_status, GameStatus::Finished);
    assert!(final_room.players.iter().all(|p| p.is_finished));

    let bob_id = bob.view().player_id().unwrap();
    let ada_id = ada.view().player_id().unwrap();
    let ranking: Vec<_> = ada
        .view()
        .standings()
        .iter()
        .map(|row| (row.player.id, row.rank))
        .collect();
    assert_eq!(ranking, vec![(bob_id, Some(1)), (ada_id, Some(2))]);

    expect_event(&mut bob, "game-finished").await;
    assert_eq!(rooms.room_count().await, 1);
}

#[tokio::test]
async fn test_sole_player_disconnect_deletes_room() {
    let (url, rooms) = start_server().await;
    let mut ada = client(&url).await;
    let room_id = host(&mut ada, "Ada", None).await;
    assert_eq!(rooms.room_count().await, 1);

    ada.close().await.unwrap();
    wait_for_room_count(&rooms, 0).await;

    let mut bob = client(&url).await;
    bob.join_room(room_id.as_str(), "Bob").await.unwrap();
    assert_eq!(expect_error(&mut bob).await, "Room not found");
}

#[tokio::test]
async fn test_disconnect_notifies_remaining_members() {
    let (url, _) = start_server().await;
    let mut ada = client(&url).await;
    let mut bob = client(&url).await;
    let room_id = host(&mut ada, "Ada", None).await;
    join(&mut bob, &room_id, "Bob").await;
    let bob_id = bob.view().player_id().unwrap();

    bob.close().await.unwrap();

    match expect_event(&mut ada, "player-left").await {
        ServerEvent::PlayerLeft { player_id } => assert_eq!(player_id, bob_id),
        other => panic!("expected player-left, got {other:?}"),
    }
    match expect_event(&mut ada, "room-updated").await {
        ServerEvent::RoomUpdated { game_room } => assert_eq!(game_room.players.len(), 1),
        other => panic!("expected room-updated, got {other:?}"),
    }
}

#[tokio::test]
async fn test_leave_room_then_leave_again_fails() {
    let (url, _) = start_server().await;
    let mut ada = client(&url).await;
    let mut bob = client(&url).await;
    let room_id = host(&mut ada, "Ada", None).await;
    join(&mut bob, &room_id, "Bob").await;

    bob.leave_room().await.unwrap();
    expect_event(&mut ada, "player-left").await;
    expect_event(&mut ada, "room-updated").await;

    bob.send(&ClientMessage::LeaveRoom {
        room_id: room_id.clone(),
    })
    .await
    .unwrap();
    assert_eq!(expect_error(&mut bob).await, format!("Not in room {room_id}"));

    // Out of the room, Bob may join again.
    join(&mut bob, &room_id, "Bob").await;
}

#[tokio::test]
async fn test_create_while_in_room_is_rejected() {
    let (url, rooms) = start_server().await;
    let mut ada = client(&url).await;
    let room_id = host(&mut ada, "Ada", None).await;

    ada.create_room("Ada", "Coffee", "Ethiopia", None).await.unwrap();

    assert_eq!(expect_error(&mut ada).await, format!("Already in room {room_id}"));
    assert_eq!(rooms.room_count().await, 1);
}

#[tokio::test]
async fn test_join_full_room_is_rejected() {
    let (url, _) = start_server().await;
    let mut ada = client(&url).await;
    let mut bob = client(&url).await;
    let mut cy = client(&url).await;
    let room_id = host(&mut ada, "Ada", Some(2)).await;
    join(&mut bob, &room_id, "Bob").await;

    cy.join_room(room_id.as_str(), "Cy").await.unwrap();

    assert_eq!(expect_error(&mut cy).await, "Room is full");
}

#[tokio::test]
async fn test_join_is_case_insensitive() {
    let (url, _) = start_server().await;
    let mut ada = client(&url).await;
    let mut bob = client(&url).await;
    let room_id = host(&mut ada, "Ada", None).await;

    bob.join_room(&room_id.as_str().to_lowercase(), "Bob")
        .await
        .unwrap();

    match expect_event(&mut bob, "room-joined").await {
        ServerEvent::RoomJoined { game_room } => assert_eq!(game_room.id, room_id),
        other => panic!("expected room-joined, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_creator_cannot_start() {
    let (url, rooms) = start_server().await;
    let mut ada = client(&url).await;
    let mut bob = client(&url).await;
    let room_id = host(&mut ada, "Ada", None).await;
    join(&mut bob, &room_id, "Bob").await;

    bob.start_game().await.unwrap();

    assert_eq!(expect_error(&mut bob).await, "Not authorized to start game");
    let snapshot = rooms.snapshot(&room_id).await.unwrap();
    assert_eq!(snapshot.game_status, GameStatus::Waiting);
}

#[tokio::test]
async fn test_invalid_capacity_is_rejected() {
    let (url, rooms) = start_server().await;
    let mut ada = client(&url).await;

    ada.create_room("Ada", "Dog", "Canidae", Some(1)).await.unwrap();

    assert_eq!(expect_error(&mut ada).await, "maxPlayers must be between 2 and 8");
    assert_eq!(rooms.room_count().await, 0);
}

#[tokio::test]
async fn test_omitted_capacity_uses_configured_default() {
    let room_config = RoomConfig {
        default_max_players: 6,
        ..RoomConfig::default()
    };
    let (url, _) = start_server_with(WikiraceServer::builder().room_config(room_config)).await;
    let mut ada = client(&url).await;

    ada.create_room("Ada", "Dog", "Canidae", None).await.unwrap();

    match expect_event(&mut ada, "room-created").await {
        ServerEvent::RoomCreated { game_room, .. } => assert_eq!(game_room.max_players, 6),
        other => panic!("expected room-created, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_frame_keeps_connection_open() {
    let (url, _) = start_server().await;
    let mut ws = raw(&url).await;

    ws.send(Message::text("not json")).await.unwrap();
    match next_event(&mut ws).await {
        ServerEvent::Error { message } => assert!(message.starts_with("Invalid message")),
        other => panic!("expected error, got {other:?}"),
    }

    ws.send(Message::text(r#"{"event":"ping","data":{"clientTime":42}}"#))
        .await
        .unwrap();
    match next_event(&mut ws).await {
        ServerEvent::Pong { client_time, .. } => assert_eq!(client_time, 42),
        other => panic!("expected pong, got {other:?}"),
    }
}

#[tokio::test]
async fn test_ping_is_answered_with_pong() {
    let (url, _) = start_server().await;
    let mut ada = client(&url).await;

    ada.ping().await.unwrap();

    match expect_event(&mut ada, "pong").await {
        ServerEvent::Pong {
            client_time,
            server_time,
        } => {
            assert!(client_time > 0);
            assert!(server_time > 0);
        }
        other => panic!("expected pong, got {other:?}"),
    }
}

#[tokio::test]
async fn test_idle_connection_is_closed_and_cleaned_up() {
    let (url, rooms) =
        start_server_with(WikiraceServer::builder().idle_timeout(Duration::from_millis(200))).await;
    let mut ws = raw(&url).await;

    ws.send(Message::text(
        r#"{"event":"create-room","data":{"playerName":"Ada","startArticle":"Dog","targetArticle":"Canidae"}}"#,
    ))
    .await
    .unwrap();
    assert!(matches!(next_event(&mut ws).await, ServerEvent::RoomCreated { .. }));
    assert!(matches!(next_event(&mut ws).await, ServerEvent::RoomUpdated { .. }));

    let closed = tokio::time::timeout(WAIT, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "server should close an idle connection");

    wait_for_room_count(&rooms, 0).await;
}

#[tokio::test]
async fn test_rooms_are_independent() {
    let (url, rooms) = start_server().await;
    let mut ada = client(&url).await;
    let mut bob = client(&url).await;

    let first = host(&mut ada, "Ada", None).await;
    let second = host(&mut bob, "Bob", None).await;
    assert_ne!(first, second);

    ada.start_game().await.unwrap();
    expect_event(&mut ada, "game-started").await;

    let other = rooms.snapshot(&second).await.unwrap();
    assert_eq!(other.game_status, GameStatus::Waiting);
}
