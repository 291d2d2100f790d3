// models/live_stream.rs
use bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{AppError, Result};

// One stream descriptor per broadcast. Never deleted - a finished stream is
// deactivated (isActive=false, endedAt set) so viewers can still resolve it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStream {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub event_id: i64,

    pub stream_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hls_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_url: Option<String>,

    pub title: String,

    pub status: String, // "pending", "active", "ended"

    pub stream_type: String, // hls, webrtc, etc.

    pub is_active: bool,

    pub quality: String, // 720p, 1080p, etc.

    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_qualities: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,

    pub started_at: BsonDateTime,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<BsonDateTime>,
}

// Producer payload for creating or updating a stream. Everything except the
// target is optional: with an id this is a partial merge-update, without one
// it creates a fresh descriptor and the gaps are filled with defaults.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StreamUpdatePayload {
    pub id: Option<String>,

    pub event_id: Option<i64>,

    #[validate(url(message = "streamUrl must be a valid URL"))]
    pub stream_url: Option<String>,

    #[validate(url(message = "hlsUrl must be a valid URL"))]
    pub hls_url: Option<String>,

    #[validate(url(message = "fallbackUrl must be a valid URL"))]
    pub fallback_url: Option<String>,

    pub title: Option<String>,

    pub status: Option<String>,

    pub stream_type: Option<String>,

    pub quality: Option<String>,

    pub available_qualities: Option<Vec<String>>,

    #[validate(url(message = "posterUrl must be a valid URL"))]
    pub poster_url: Option<String>,

    pub is_active: Option<bool>,
}

impl StreamUpdatePayload {
    // Build a new active descriptor, defaulting the fields the producer left out.
    pub fn into_new_stream(self, now: BsonDateTime) -> Result<LiveStream> {
        let event_id = self
            .event_id
            .ok_or_else(|| AppError::invalid_data("eventId is required when creating a stream"))?;
        let stream_url = self
            .stream_url
            .ok_or_else(|| AppError::invalid_data("streamUrl is required when creating a stream"))?;

        Ok(LiveStream {
            id: None,
            event_id,
            stream_url,
            hls_url: self.hls_url,
            fallback_url: self.fallback_url,
            title: self
                .title
                .unwrap_or_else(|| format!("Event #{} Stream", event_id)),
            status: self.status.unwrap_or_else(|| "active".to_string()),
            stream_type: self.stream_type.unwrap_or_else(|| "hls".to_string()),
            is_active: true,
            quality: self.quality.unwrap_or_else(|| "720p".to_string()),
            available_qualities: self.available_qualities,
            poster_url: self.poster_url,
            started_at: now,
            ended_at: None,
        })
    }

    // Merge a partial update onto a stored descriptor. Deactivating a stream
    // stamps endedAt; the field is left untouched otherwise.
    pub fn merge_into(self, stream: &mut LiveStream, now: BsonDateTime) {
        if let Some(event_id) = self.event_id {
            stream.event_id = event_id;
        }
        if let Some(stream_url) = self.stream_url {
            stream.stream_url = stream_url;
        }
        if let Some(hls_url) = self.hls_url {
            stream.hls_url = Some(hls_url);
        }
        if let Some(fallback_url) = self.fallback_url {
            stream.fallback_url = Some(fallback_url);
        }
        if let Some(title) = self.title {
            stream.title = title;
        }
        if let Some(status) = self.status {
            stream.status = status;
        }
        if let Some(stream_type) = self.stream_type {
            stream.stream_type = stream_type;
        }
        if let Some(quality) = self.quality {
            stream.quality = quality;
        }
        if let Some(available_qualities) = self.available_qualities {
            stream.available_qualities = Some(available_qualities);
        }
        if let Some(poster_url) = self.poster_url {
            stream.poster_url = Some(poster_url);
        }
        if let Some(is_active) = self.is_active {
            stream.is_active = is_active;
            if !is_active && stream.ended_at.is_none() {
                stream.ended_at = Some(now);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(event_id: Option<i64>, stream_url: Option<&str>) -> StreamUpdatePayload {
        StreamUpdatePayload {
            id: None,
            event_id,
            stream_url: stream_url.map(String::from),
            hls_url: None,
            fallback_url: None,
            title: None,
            status: None,
            stream_type: None,
            quality: None,
            available_qualities: None,
            poster_url: None,
            is_active: None,
        }
    }

    #[test]
    fn new_stream_fills_defaults() {
        let now = BsonDateTime::now();
        let stream = payload(Some(42), Some("https://cdn.example.com/42.m3u8"))
            .into_new_stream(now)
            .unwrap();

        assert_eq!(stream.event_id, 42);
        assert_eq!(stream.title, "Event #42 Stream");
        assert_eq!(stream.status, "active");
        assert_eq!(stream.stream_type, "hls");
        assert_eq!(stream.quality, "720p");
        assert!(stream.is_active);
        assert!(stream.ended_at.is_none());
    }

    #[test]
    fn new_stream_requires_event_and_url() {
        let now = BsonDateTime::now();
        assert!(payload(None, Some("https://cdn.example.com/a.m3u8"))
            .into_new_stream(now)
            .is_err());
        assert!(payload(Some(42), None).into_new_stream(now).is_err());
    }

    #[test]
    fn merge_keeps_unset_fields_and_stamps_ended_at() {
        let now = BsonDateTime::now();
        let mut stream = payload(Some(7), Some("https://cdn.example.com/7.m3u8"))
            .into_new_stream(now)
            .unwrap();

        let mut update = payload(None, None);
        update.quality = Some("1080p".to_string());
        update.is_active = Some(false);
        update.merge_into(&mut stream, now);

        assert_eq!(stream.event_id, 7);
        assert_eq!(stream.quality, "1080p");
        assert_eq!(stream.stream_url, "https://cdn.example.com/7.m3u8");
        assert!(!stream.is_active);
        assert!(stream.ended_at.is_some());
    }

    #[test]
    fn payload_rejects_bad_urls() {
        use validator::Validate;

        let mut bad = payload(Some(1), Some("not-a-url"));
        assert!(bad.validate().is_err());
        bad.stream_url = Some("https://cdn.example.com/ok.m3u8".to_string());
        assert!(bad.validate().is_ok());
    }
}
