use mongodb::{Client, Database};

use crate::errors::{AppError, Result};

pub async fn get_db_client(database_url: &str, database_name: &str) -> Result<Database> {
    let client = Client::with_uri_str(database_url).await?;
    let db = client.database(database_name);

    // Verify the database is reachable up front so a bad URL surfaces at
    // startup instead of on the first live update.
    match db.list_collection_names().await {
        Ok(collections) => {
            tracing::info!("✅ Connected to database: {}", database_name);
            tracing::info!("📂 Collections found: {:?}", collections);
        }
        Err(e) => {
            return Err(AppError::configuration(format!(
                "database '{}' is inaccessible: {}",
                database_name, e
            )));
        }
    }

    Ok(db)
}
