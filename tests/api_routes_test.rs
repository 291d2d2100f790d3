// REST surface tests: the routine read/write glue around the live records.
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use betstream_api::services::memory_store::MemoryLiveStore;
use betstream_api::state::AppState;

fn app() -> Router {
    betstream_api::build_router(AppState::new(Arc::new(MemoryLiveStore::new())))
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn patch_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("PATCH")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn stream_lifecycle_over_rest() {
    let app = app();

    // nothing exists yet
    let response = app.clone().oneshot(get("/api/events/42/stream")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // create with defaults
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/streams",
            r#"{"eventId": 42, "streamUrl": "https://cdn.example.com/42.m3u8"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["title"], "Event #42 Stream");
    assert_eq!(created["status"], "active");
    assert_eq!(created["quality"], "720p");
    let id = created["_id"]["$oid"].as_str().expect("generated id").to_string();

    // lookup by event resolves the active stream
    let response = app.clone().oneshot(get("/api/events/42/stream")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let found = body_json(response).await;
    assert_eq!(found["_id"]["$oid"], id.as_str());

    // partial update merges onto the stored descriptor
    let response = app
        .clone()
        .oneshot(patch_json(
            &format!("/api/streams/{}", id),
            r#"{"quality": "1080p"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["quality"], "1080p");
    assert_eq!(updated["streamUrl"], "https://cdn.example.com/42.m3u8");

    // a second stream for the same event deactivates the first
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/streams",
            r#"{"eventId": 42, "streamUrl": "https://cdn.example.com/42-b.m3u8"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.clone().oneshot(get("/api/events/42/stream")).await.unwrap();
    let active = body_json(response).await;
    assert_eq!(active["streamUrl"], "https://cdn.example.com/42-b.m3u8");

    let response = app.clone().oneshot(get("/api/streams?eventId=42")).await.unwrap();
    let all = body_json(response).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn create_stream_validates_payload() {
    let app = app();

    // missing streamUrl
    let response = app
        .clone()
        .oneshot(post_json("/api/streams", r#"{"eventId": 42}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // malformed URL
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/streams",
            r#"{"eventId": 42, "streamUrl": "not a url"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // unknown status value
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/streams",
            r#"{"eventId": 42, "streamUrl": "https://cdn.example.com/42.m3u8", "status": "paused"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_stream_handles_bad_ids() {
    let app = app();

    let response = app
        .clone()
        .oneshot(patch_json("/api/streams/not-an-oid", r#"{"quality": "1080p"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(patch_json(
            "/api/streams/0123456789abcdef01234567",
            r#"{"quality": "1080p"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_endpoint_reports_missing_rows() {
    let app = app();

    let response = app.clone().oneshot(get("/api/events/42/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = app();

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["connected_subscribers"], 0);
}
