//! WebSocket client for a wikirace server.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use wikirace_protocol::clock::now_millis;
use wikirace_protocol::{ClientMessage, Codec, JsonCodec, RoomCode, ServerEvent};

use crate::{ClientError, ClientView};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A connection to a wikirace server plus the view it maintains.
///
/// Every event returned by [`recv`](Self::recv) has already been applied
/// to [`view`](Self::view).
pub struct RaceClient {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
    codec: JsonCodec,
    view: ClientView,
}

impl RaceClient {
    /// Connects to `url` (e.g. `ws://127.0.0.1:8080`).
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        let (ws, _) = connect_async(url).await.map_err(ClientError::Connect)?;
        let (sink, stream) = ws.split();
        tracing::debug!(%url, "connected");
        Ok(Self {
            sink,
            stream,
            codec: JsonCodec,
            view: ClientView::new(),
        })
    }

    pub fn view(&self) -> &ClientView {
        &self.view
    }

    /// Sends any client message as-is.
    pub async fn send(&mut self, msg: &ClientMessage) -> Result<(), ClientError> {
        let bytes = self.codec.encode(msg)?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        self.sink
            .send(Message::text(text))
            .await
            .map_err(ClientError::Send)
    }

    /// Opens a room. `max_players: None` takes the server's default.
    pub async fn create_room(
        &mut self,
        player_name: &str,
        start_article: &str,
        target_article: &str,
        max_players: Option<usize>,
    ) -> Result<(), ClientError> {
        self.send(&ClientMessage::CreateRoom {
            player_name: player_name.to_owned(),
            start_article: start_article.to_owned(),
            target_article: target_article.to_owned(),
            max_players,
        })
        .await
    }

    pub async fn join_room(&mut self, room_id: &str, player_name: &str) -> Result<(), ClientError> {
        self.send(&ClientMessage::JoinRoom {
            room_id: RoomCode::from(room_id),
            player_name: player_name.to_owned(),
        })
        .await
    }

    /// Starts the race in the current room.
    pub async fn start_game(&mut self) -> Result<(), ClientError> {
        let room_id = self.room_id()?;
        self.send(&ClientMessage::StartGame { room_id }).await
    }

    /// Reports a move in the current room.
    pub async fn navigate(&mut self, article_title: &str) -> Result<(), ClientError> {
        let room_id = self.room_id()?;
        self.send(&ClientMessage::NavigateArticle {
            room_id,
            article_title: article_title.to_owned(),
        })
        .await
    }

    /// Leaves the current room and clears it from the view.
    pub async fn leave_room(&mut self) -> Result<(), ClientError> {
        let room_id = self.room_id()?;
        self.send(&ClientMessage::LeaveRoom { room_id }).await?;
        self.view = std::mem::take(&mut self.view).leave();
        Ok(())
    }

    pub async fn ping(&mut self) -> Result<(), ClientError> {
        self.send(&ClientMessage::Ping {
            client_time: now_millis(),
        })
        .await
    }

    /// Next server event, or `None` once the server closes the connection.
    pub async fn recv(&mut self) -> Result<Option<ServerEvent>, ClientError> {
        while let Some(frame) = self.stream.next().await {
            let bytes = match frame.map_err(ClientError::Receive)? {
                Message::Text(text) => text.as_bytes().to_vec(),
                Message::Binary(data) => data.to_vec(),
                Message::Close(_) => return Ok(None),
                _ => continue,
            };
            let event: ServerEvent = self.codec.decode(&bytes)?;
            self.view = std::mem::take(&mut self.view).apply(&event, now_millis());
            tracing::trace!(event = event.name(), "event received");
            return Ok(Some(event));
        }
        Ok(None)
    }

    /// Receives until an event named `name` arrives and returns it. Events
    /// skipped on the way are still applied to the view.
    pub async fn recv_until(&mut self, name: &str) -> Result<Option<ServerEvent>, ClientError> {
        while let Some(event) = self.recv().await? {
            if event.name() == name {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }

    /// Closes the connection.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.sink.close().await.map_err(ClientError::Send)
    }

    fn room_id(&self) -> Result<RoomCode, ClientError> {
        self.view
            .room()
            .map(|room| room.id.clone())
            .ok_or(ClientError::NotInRoom)
    }
}
