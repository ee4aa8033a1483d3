#![cfg(test)]
use configs::DatabaseConfig;
use sea_orm::DatabaseConnection;

use models::db::{connect_with_config, prepare};

use crate::catalog::password::hash_password;

/// Clear-text password of every seeded user.
pub const SEED_PASSWORD: &str = "123456";

/// Fresh in-memory database, migrated and loaded with the demo catalog.
/// Each call gets its own database, so tests never see each other's writes.
pub async fn seeded_db() -> Result<DatabaseConnection, anyhow::Error> {
    let cfg = DatabaseConfig::sqlite_memory();
    let db = connect_with_config(&cfg).await?;
    prepare(&db, &cfg, &hash_password(SEED_PASSWORD)?).await?;
    Ok(db)
}
