//! WebSocket connection handlers.
//!
//! Each connection runs two pumps: the inbound pump decodes frames and hands
//! them to the room, the outbound pump drains the client's queue into the
//! socket. Whichever ends first aborts the other, then the client is
//! dismissed from its room exactly once.

use std::{fmt::Display, sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::{Sink, SinkExt},
    stream::{SplitStream, StreamExt},
};
use serde::Deserialize;
use tokio::{
    sync::mpsc,
    time::{Instant, timeout},
};

use crate::{
    domain::{ClientId, ClientIdFactory, EventPayload, Outbound, RoomHandle, RoomId},
    infrastructure::dto::websocket::WireMessage,
    ui::state::AppState,
};

use super::error::ApiError;

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub room_id: Option<String>,
}

/// `GET /ws?room_id=<id>`
///
/// The room is resolved before the upgrade so that a missing id (400) or a
/// full registry (503) can still be answered with a plain HTTP error.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(room_id) = query.room_id.filter(|id| !id.trim().is_empty()) else {
        tracing::warn!("WebSocket request without room_id");
        return Err(ApiError::BadRequest("room_id is required".to_string()));
    };
    let room_id = RoomId::new(room_id)?;

    let room = match state.connect_participant_usecase.resolve_room(room_id).await {
        Ok(room) => room,
        Err(e) => {
            tracing::warn!("Cannot open a room for the connection: {}", e);
            return Err(e.into());
        }
    };
    let client_id =
        ClientIdFactory::generate().map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, room, client_id)))
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    room: Arc<dyn RoomHandle>,
    client_id: ClientId,
) {
    let (tx, rx) = mpsc::channel(state.hub.client_queue_capacity);

    if let Err(e) = state
        .connect_participant_usecase
        .execute(&room, client_id.clone(), tx)
        .await
    {
        tracing::warn!("Client '{}' could not join: {}", client_id, e);
        return;
    }
    tracing::info!("Client '{}' connected to room '{}'", client_id, room.id());

    let (sender, receiver) = socket.split();

    let mut send_task = tokio::spawn(pusher_loop(
        rx,
        sender,
        client_id.clone(),
        state.hub.write_timeout,
        state.hub.ping_interval,
    ));
    let mut recv_task = tokio::spawn(receiver_loop(
        receiver,
        state.clone(),
        room.clone(),
        client_id.clone(),
        state.hub.read_timeout,
    ));

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state
        .disconnect_participant_usecase
        .execute(&room, client_id.clone())
        .await;
    tracing::info!("Client '{}' disconnected from room '{}'", client_id, room.id());
}

/// Drains the client's queue into the socket.
///
/// The queue closing (the room dropped its sender) is the signal to say
/// goodbye with a close frame. A queue that stays idle for `ping_interval`
/// gets a ping of its own.
async fn pusher_loop<S>(
    mut rx: mpsc::Receiver<Outbound>,
    mut sender: S,
    client_id: ClientId,
    write_timeout: Duration,
    ping_interval: Duration,
) where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let idle = tokio::time::sleep(ping_interval);
    tokio::pin!(idle);

    loop {
        let frame = tokio::select! {
            item = rx.recv() => {
                let Some(item) = item else { break };
                idle.as_mut().reset(Instant::now() + ping_interval);
                match item {
                    Outbound::Event(event) => {
                        match serde_json::to_string(&WireMessage::from(event.as_ref())) {
                            Ok(text) => Message::Text(text.into()),
                            Err(e) => {
                                tracing::warn!("Failed to serialize event for '{}': {}", client_id, e);
                                continue;
                            }
                        }
                    }
                    Outbound::Probe => Message::Ping(Bytes::new()),
                }
            }
            _ = &mut idle => {
                idle.as_mut().reset(Instant::now() + ping_interval);
                Message::Ping(Bytes::new())
            }
        };

        match timeout(write_timeout, sender.send(frame)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!("Write to '{}' failed: {}", client_id, e);
                return;
            }
            Err(_) => {
                tracing::warn!("Write to '{}' timed out", client_id);
                return;
            }
        }
    }

    let _ = timeout(write_timeout, sender.send(Message::Close(None))).await;
    tracing::debug!("Outbound queue of '{}' closed", client_id);
}

/// Decodes inbound frames and hands them to the room.
///
/// Every frame, pongs included, refreshes the read deadline.
async fn receiver_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    room: Arc<dyn RoomHandle>,
    client_id: ClientId,
    read_timeout: Duration,
) {
    loop {
        let msg = match timeout(read_timeout, receiver.next()).await {
            Ok(Some(Ok(msg))) => msg,
            Ok(Some(Err(e))) => {
                tracing::debug!("Read from '{}' failed: {}", client_id, e);
                return;
            }
            Ok(None) => return,
            Err(_) => {
                tracing::info!("Client '{}' timed out", client_id);
                return;
            }
        };

        match msg {
            Message::Text(text) => {
                let payload = match WireMessage::parse(text.as_str()).and_then(EventPayload::try_from)
                {
                    Ok(payload) => payload,
                    Err(e) => {
                        tracing::warn!("Discarding frame from '{}': {}", client_id, e);
                        continue;
                    }
                };
                tracing::debug!("Received {:?} from '{}'", payload, client_id);

                if !state
                    .relay_event_usecase
                    .execute(&room, client_id.clone(), payload)
                    .await
                {
                    return;
                }
            }
            Message::Close(_) => {
                tracing::info!("Client '{}' requested close", client_id);
                return;
            }
            // Ping/pong is handled automatically by the WebSocket protocol
            _ => {}
        }
    }
}
