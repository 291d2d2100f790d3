use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;

use betstream_api::config::AppConfig;
use betstream_api::database::connection::get_db_client;
use betstream_api::services::live_store::{LiveStore, MongoLiveStore};
use betstream_api::services::memory_store::MemoryLiveStore;
use betstream_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = AppConfig::from_env();
    let store = initialize_store(&config).await;
    let state = AppState::new(store);

    let app = betstream_api::build_router(state);
    start_server(app, &config).await;
}

async fn initialize_store(config: &AppConfig) -> Arc<dyn LiveStore> {
    match &config.database_url {
        Some(database_url) => match get_db_client(database_url, &config.database_name).await {
            Ok(db) => {
                tracing::info!("✅ MongoDB live store initialized");
                Arc::new(MongoLiveStore::new(db))
            }
            Err(e) => {
                tracing::error!("❌ Failed to connect to MongoDB: {}", e);
                tracing::warn!("Falling back to in-memory live store; data will not survive a restart");
                Arc::new(MemoryLiveStore::new())
            }
        },
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory live store");
            Arc::new(MemoryLiveStore::new())
        }
    }
}

async fn start_server(app: Router, config: &AppConfig) {
    let host = config
        .host
        .parse::<std::net::IpAddr>()
        .unwrap_or_else(|_| std::net::IpAddr::from([0, 0, 0, 0]));
    let addr = SocketAddr::from((host, config.port));

    tracing::info!("🚀 Server starting on {}", addr);

    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            axum::serve(listener, app).await.unwrap();
        }
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    }
}
