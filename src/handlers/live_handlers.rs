use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::errors::{AppError, Result};
use crate::models::live_stats::LiveStreamStats;
use crate::models::live_stream::{LiveStream, StreamUpdatePayload};
use crate::models::ws_messages::{ClientMessage, ServerMessage};
use crate::services::live_hub::ClientId;
use crate::state::AppState;

// ============ WebSocket session ============

pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

// One task pair per client socket. The writer drains an unbounded channel so
// a slow or closing peer can never block the broadcaster; the read loop
// finishes handling each inbound frame before taking the next, which keeps
// same-event broadcasts in persistence-completion order.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let client_id = ClientId::new_v4();
    tracing::info!(%client_id, "client connected to live websocket");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            match serde_json::to_string(&message) {
                Ok(json) => {
                    if ws_tx.send(Message::Text(json)).await.is_err() {
                        // peer is gone; remaining queued sends are dropped
                        break;
                    }
                }
                Err(e) => tracing::error!("failed to serialize outbound frame: {}", e),
            }
        }
    });

    while let Some(frame) = ws_rx.next().await {
        match frame {
            Ok(Message::Text(text)) => handle_frame(&state, client_id, &tx, &text).await,
            Ok(Message::Close(_)) => break,
            Ok(_) => {} // binary/ping/pong frames carry nothing for us
            Err(e) => {
                tracing::warn!(%client_id, "websocket receive error: {}", e);
                break;
            }
        }
    }

    state.hub.deregister(client_id).await;
    writer.abort();
    tracing::info!(%client_id, "client disconnected from live websocket");
}

// Malformed or unknown frames are logged and dropped: the connection stays
// open and the sender gets no error frame back. Producer updates that fail
// validation or persistence are handled the same way (fire-and-forget).
async fn handle_frame(
    state: &AppState,
    client_id: ClientId,
    tx: &UnboundedSender<ServerMessage>,
    text: &str,
) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(%client_id, "ignoring malformed frame: {}", e);
            return;
        }
    };

    match message {
        ClientMessage::Subscribe { event_id } => {
            state.hub.register(client_id, event_id, tx.clone()).await;
            tracing::info!(%client_id, event_id, "client subscribed to event");

            // snapshot goes to this connection only, never broadcast
            state.live.send_snapshot(event_id, tx).await;
        }
        ClientMessage::StreamUpdate { stream } => {
            if let Err(e) = state.live.apply_stream_update(stream).await {
                tracing::warn!(%client_id, "stream update rejected: {}", e);
            }
        }
        ClientMessage::Stats { event_id, stats } => {
            if let Err(e) = state.live.apply_stats_update(event_id, stats).await {
                tracing::warn!(%client_id, event_id, "stats update rejected: {}", e);
            }
        }
    }
}

// ============ REST surface over the same records ============

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamQuery {
    pub event_id: Option<i64>,
}

pub async fn get_event_stream(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Json<LiveStream>> {
    match state.store.get_stream_by_event(event_id).await? {
        Some(stream) => Ok(Json(stream)),
        None => Err(AppError::StreamNotFound),
    }
}

pub async fn get_event_stats(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Json<LiveStreamStats>> {
    match state.store.get_stats_by_event(event_id).await? {
        Some(stats) => Ok(Json(stats)),
        None => Err(AppError::StatsNotFound),
    }
}

pub async fn get_streams(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Json<Vec<LiveStream>>> {
    let streams = state.store.get_streams(query.event_id).await?;
    Ok(Json(streams))
}

pub async fn create_stream(
    State(state): State<AppState>,
    Json(payload): Json<StreamUpdatePayload>,
) -> Result<(StatusCode, Json<LiveStream>)> {
    let stream = state.live.upsert_stream(payload).await?;
    Ok((StatusCode::CREATED, Json(stream)))
}

pub async fn update_stream(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut payload): Json<StreamUpdatePayload>,
) -> Result<Json<LiveStream>> {
    payload.id = Some(id);
    let stream = state.live.upsert_stream(payload).await?;
    Ok(Json(stream))
}
