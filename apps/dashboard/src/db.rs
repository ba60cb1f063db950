use anyhow::Result;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use tracing::info;

/// Collection holding one precomputed match document per user.
pub const MATCHES_COLLECTION: &str = "matches";
/// Collection holding parsed resume records written by the resume processor.
pub const RESUMES_COLLECTION: &str = "resumes";
/// Append-only like/dislike records.
pub const FEEDBACK_COLLECTION: &str = "feedback";

/// Creates the MongoDB client and returns it with a handle to the configured database.
/// The driver connects lazily; this only validates the connection string.
pub async fn create_client(mongo_uri: &str, db_name: &str) -> Result<(Client, Database)> {
    info!("Connecting to MongoDB...");

    let mut options = ClientOptions::parse(mongo_uri).await?;
    options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
    let client = Client::with_options(options)?;
    let db = client.database(db_name);

    info!("MongoDB client initialized (database: {db_name})");
    Ok((client, db))
}
