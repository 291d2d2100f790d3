// models/live_stats.rs
use std::collections::HashMap;

use bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

// Per-metric home/away split. The key set is open on purpose - possession,
// shots and corners for football, rebounds and steals for basketball, and so
// on. An absent metric means "unknown", not zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamSplit {
    pub home: f64,
    pub away: f64,
}

pub type StatsMap = HashMap<String, TeamSplit>;

// A key moment marker inside the stream timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub time: f64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// One stats snapshot per event, upserted. Every update replaces the whole
// metric map - there is no per-key merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStreamStats {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub event_id: i64,

    pub stats: StatsMap,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Vec<Highlight>>,

    pub last_updated: BsonDateTime,
}
