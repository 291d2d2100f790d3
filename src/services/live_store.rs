// services/live_store.rs
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use futures_util::TryStreamExt;
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

use crate::errors::{AppError, Result};
use crate::models::live_stats::{LiveStreamStats, StatsMap};
use crate::models::live_stream::{LiveStream, StreamUpdatePayload};

pub const STREAMS_COLLECTION: &str = "live_streams";
pub const STATS_COLLECTION: &str = "live_stream_stats";

// Storage collaborator for the live core. Each call is a single independent
// upsert/read; the core never coordinates multi-step transactions across it.
#[async_trait]
pub trait LiveStore: Send + Sync {
    fn backend(&self) -> &'static str;

    // The active descriptor for an event, if a broadcast is running.
    async fn get_stream_by_event(&self, event_id: i64) -> Result<Option<LiveStream>>;

    // All descriptors, active or ended, optionally filtered by event.
    async fn get_streams(&self, event_id: Option<i64>) -> Result<Vec<LiveStream>>;

    // Create (no id) or merge-update (id present) a descriptor. Activating a
    // descriptor deactivates any other active one for the same event, so at
    // most one stream per event is ever live.
    async fn upsert_stream(&self, payload: StreamUpdatePayload) -> Result<LiveStream>;

    async fn get_stats_by_event(&self, event_id: i64) -> Result<Option<LiveStreamStats>>;

    // Full overwrite of the metric map, creating the snapshot row on first
    // update. Highlights already stored for the event are preserved.
    async fn upsert_stats(&self, event_id: i64, stats: StatsMap) -> Result<LiveStreamStats>;
}

pub struct MongoLiveStore {
    db: Database,
}

impl MongoLiveStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn streams(&self) -> Collection<LiveStream> {
        self.db.collection(STREAMS_COLLECTION)
    }

    fn stats(&self) -> Collection<LiveStreamStats> {
        self.db.collection(STATS_COLLECTION)
    }

    async fn deactivate_other_streams(
        &self,
        event_id: i64,
        keep: Option<ObjectId>,
        now: BsonDateTime,
    ) -> Result<()> {
        let mut filter = doc! { "eventId": event_id, "isActive": true };
        if let Some(id) = keep {
            filter.insert("_id", doc! { "$ne": id });
        }

        self.streams()
            .update_many(filter, doc! { "$set": { "isActive": false, "endedAt": now } })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl LiveStore for MongoLiveStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn get_stream_by_event(&self, event_id: i64) -> Result<Option<LiveStream>> {
        let stream = self
            .streams()
            .find_one(doc! { "eventId": event_id, "isActive": true })
            .await?;
        Ok(stream)
    }

    async fn get_streams(&self, event_id: Option<i64>) -> Result<Vec<LiveStream>> {
        let filter = match event_id {
            Some(event_id) => doc! { "eventId": event_id },
            None => doc! {},
        };

        let cursor = self.streams().find(filter).await?;
        let streams: Vec<LiveStream> = cursor.try_collect().await?;
        Ok(streams)
    }

    async fn upsert_stream(&self, payload: StreamUpdatePayload) -> Result<LiveStream> {
        let now = BsonDateTime::now();

        match payload.id.clone() {
            Some(raw_id) => {
                let id = ObjectId::parse_str(&raw_id)?;
                let mut stream = self
                    .streams()
                    .find_one(doc! { "_id": id })
                    .await?
                    .ok_or(AppError::StreamNotFound)?;

                payload.merge_into(&mut stream, now);

                if stream.is_active {
                    self.deactivate_other_streams(stream.event_id, Some(id), now)
                        .await?;
                }

                self.streams()
                    .replace_one(doc! { "_id": id }, &stream)
                    .await?;
                Ok(stream)
            }
            None => {
                let mut stream = payload.into_new_stream(now)?;

                self.deactivate_other_streams(stream.event_id, None, now)
                    .await?;

                let inserted = self.streams().insert_one(&stream).await?;
                stream.id = inserted.inserted_id.as_object_id();
                Ok(stream)
            }
        }
    }

    async fn get_stats_by_event(&self, event_id: i64) -> Result<Option<LiveStreamStats>> {
        let stats = self.stats().find_one(doc! { "eventId": event_id }).await?;
        Ok(stats)
    }

    async fn upsert_stats(&self, event_id: i64, stats: StatsMap) -> Result<LiveStreamStats> {
        let stats_doc = bson::to_bson(&stats)
            .map_err(|e| AppError::service(format!("failed to encode stats map: {}", e)))?;

        let update = doc! {
            "$set": { "stats": stats_doc, "lastUpdated": BsonDateTime::now() },
        };

        let snapshot = self
            .stats()
            .find_one_and_update(doc! { "eventId": event_id }, update)
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| AppError::service("stats upsert returned no document"))?;
        Ok(snapshot)
    }
}
