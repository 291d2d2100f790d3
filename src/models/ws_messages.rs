// models/ws_messages.rs
use serde::{Deserialize, Serialize};

use crate::models::live_stats::{LiveStreamStats, StatsMap};
use crate::models::live_stream::{LiveStream, StreamUpdatePayload};

// Inbound frames, dispatched on the "type" field. Anything that does not
// parse into one of these is logged and dropped without closing the socket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    // Bind this connection to one event's updates and get a snapshot back.
    #[serde(rename_all = "camelCase")]
    Subscribe { event_id: i64 },

    // Producer pushes a stream descriptor create/update.
    StreamUpdate { stream: StreamUpdatePayload },

    // Producer pushes a full replacement of an event's stats map.
    #[serde(rename_all = "camelCase")]
    Stats { event_id: i64, stats: StatsMap },
}

// Outbound frames. Sent to one connection (snapshot) or fanned out to every
// subscriber of the event (after an ingest).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    StreamInfo { stream: LiveStream },
    Stats { stats: LiveStreamStats },
}
