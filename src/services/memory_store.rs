// services/memory_store.rs
use std::collections::HashMap;

use async_trait::async_trait;
use bson::{oid::ObjectId, DateTime as BsonDateTime};
use tokio::sync::RwLock;

use crate::errors::{AppError, Result};
use crate::models::live_stats::{LiveStreamStats, StatsMap};
use crate::models::live_stream::{LiveStream, StreamUpdatePayload};
use crate::services::live_store::LiveStore;

// In-memory LiveStore. Backs the test suite and the degraded startup mode
// when no database is configured; everything is lost on restart.
#[derive(Default)]
pub struct MemoryLiveStore {
    streams: RwLock<Vec<LiveStream>>,
    stats: RwLock<HashMap<i64, LiveStreamStats>>,
}

impl MemoryLiveStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LiveStore for MemoryLiveStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get_stream_by_event(&self, event_id: i64) -> Result<Option<LiveStream>> {
        let streams = self.streams.read().await;
        Ok(streams
            .iter()
            .find(|stream| stream.event_id == event_id && stream.is_active)
            .cloned())
    }

    async fn get_streams(&self, event_id: Option<i64>) -> Result<Vec<LiveStream>> {
        let streams = self.streams.read().await;
        Ok(streams
            .iter()
            .filter(|stream| event_id.map_or(true, |id| stream.event_id == id))
            .cloned()
            .collect())
    }

    async fn upsert_stream(&self, payload: StreamUpdatePayload) -> Result<LiveStream> {
        let now = BsonDateTime::now();
        let mut streams = self.streams.write().await;

        match payload.id.clone() {
            Some(raw_id) => {
                let id = ObjectId::parse_str(&raw_id)?;
                let index = streams
                    .iter()
                    .position(|stream| stream.id == Some(id))
                    .ok_or(AppError::StreamNotFound)?;

                let mut stream = streams[index].clone();
                payload.merge_into(&mut stream, now);

                if stream.is_active {
                    for other in streams.iter_mut() {
                        if other.id != Some(id)
                            && other.event_id == stream.event_id
                            && other.is_active
                        {
                            other.is_active = false;
                            other.ended_at = Some(now);
                        }
                    }
                }

                streams[index] = stream.clone();
                Ok(stream)
            }
            None => {
                let mut stream = payload.into_new_stream(now)?;

                for other in streams.iter_mut() {
                    if other.event_id == stream.event_id && other.is_active {
                        other.is_active = false;
                        other.ended_at = Some(now);
                    }
                }

                stream.id = Some(ObjectId::new());
                streams.push(stream.clone());
                Ok(stream)
            }
        }
    }

    async fn get_stats_by_event(&self, event_id: i64) -> Result<Option<LiveStreamStats>> {
        let stats = self.stats.read().await;
        Ok(stats.get(&event_id).cloned())
    }

    async fn upsert_stats(&self, event_id: i64, stats: StatsMap) -> Result<LiveStreamStats> {
        let now = BsonDateTime::now();
        let mut all_stats = self.stats.write().await;

        let snapshot = all_stats
            .entry(event_id)
            .and_modify(|existing| {
                existing.stats = stats.clone();
                existing.last_updated = now;
            })
            .or_insert_with(|| LiveStreamStats {
                id: Some(ObjectId::new()),
                event_id,
                stats: stats.clone(),
                highlights: None,
                last_updated: now,
            });

        Ok(snapshot.clone())
    }
}
