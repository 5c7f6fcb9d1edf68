mod repository;

pub use repository::PgStore;

use deadpool_postgres::{Config, Pool, Runtime};
use tokio_postgres::NoTls;

/// Idempotent schema applied at startup
const SCHEMA: &str = include_str!("../../migrations/schema.sql");

/// Create a connection pool from a database URL
pub async fn create_pool(database_url: &str) -> Result<Pool, deadpool_postgres::CreatePoolError> {
    let mut cfg = Config::new();
    cfg.url = Some(database_url.to_string());
    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
}

/// Create the tables if they do not exist yet
pub async fn migrate(pool: &Pool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let client = pool.get().await?;
    client.batch_execute(SCHEMA).await?;
    tracing::info!("Database schema is up to date");
    Ok(())
}
