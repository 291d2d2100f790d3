// config.rs
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub database_name: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        AppConfig {
            // Optional on purpose: without a database the server degrades to
            // the in-memory store instead of refusing to start.
            database_url: env::var("DATABASE_URL").ok(),
            database_name: env::var("DATABASE_NAME")
                .unwrap_or_else(|_| "betstream".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .unwrap_or(10000),
        }
    }
}
