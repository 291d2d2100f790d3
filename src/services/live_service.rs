// services/live_service.rs
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::models::live_stats::{LiveStreamStats, StatsMap};
use crate::models::live_stream::{LiveStream, StreamUpdatePayload};
use crate::models::ws_messages::ServerMessage;
use crate::services::live_hub::LiveHub;
use crate::services::live_store::LiveStore;

const STREAM_STATUSES: [&str; 3] = ["pending", "active", "ended"];

// Ingest path for producer updates plus the snapshot loader for fresh
// subscribers. Broadcasts always carry the canonical persisted record, never
// the raw inbound payload.
#[derive(Clone)]
pub struct LiveService {
    store: Arc<dyn LiveStore>,
    hub: LiveHub,
}

impl LiveService {
    pub fn new(store: Arc<dyn LiveStore>, hub: LiveHub) -> Self {
        Self { store, hub }
    }

    // Validate and persist one stream descriptor update; no broadcast.
    pub async fn upsert_stream(&self, payload: StreamUpdatePayload) -> Result<LiveStream> {
        payload
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        if let Some(status) = payload.status.as_deref() {
            if !STREAM_STATUSES.contains(&status) {
                return Err(AppError::invalid_data(format!(
                    "unknown stream status '{}'",
                    status
                )));
            }
        }

        self.store.upsert_stream(payload).await
    }

    // Ingest a stream update from a producer and fan the canonical
    // descriptor out to everyone watching that event.
    pub async fn apply_stream_update(&self, payload: StreamUpdatePayload) -> Result<LiveStream> {
        let stream = self.upsert_stream(payload).await?;

        self.hub
            .broadcast(
                stream.event_id,
                ServerMessage::StreamInfo {
                    stream: stream.clone(),
                },
            )
            .await;
        Ok(stream)
    }

    // Ingest a stats update: full overwrite of the event's metric map, then
    // fan-out of the stored snapshot.
    pub async fn apply_stats_update(
        &self,
        event_id: i64,
        stats: StatsMap,
    ) -> Result<LiveStreamStats> {
        let snapshot = self.store.upsert_stats(event_id, stats).await?;

        self.hub
            .broadcast(
                event_id,
                ServerMessage::Stats {
                    stats: snapshot.clone(),
                },
            )
            .await;
        Ok(snapshot)
    }

    // Push the latest known stream and stats to one freshly subscribed
    // connection. Missing records are normal for an event nobody has
    // broadcast yet; storage failures are logged and contained so the
    // subscription itself stays alive.
    pub async fn send_snapshot(&self, event_id: i64, sender: &UnboundedSender<ServerMessage>) {
        match self.store.get_stream_by_event(event_id).await {
            Ok(Some(stream)) => {
                let _ = sender.send(ServerMessage::StreamInfo { stream });
            }
            Ok(None) => {}
            Err(e) => tracing::error!(event_id, "failed to load stream snapshot: {}", e),
        }

        match self.store.get_stats_by_event(event_id).await {
            Ok(Some(stats)) => {
                let _ = sender.send(ServerMessage::Stats { stats });
            }
            Ok(None) => {}
            Err(e) => tracing::error!(event_id, "failed to load stats snapshot: {}", e),
        }
    }
}
