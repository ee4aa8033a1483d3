use configs::DatabaseConfig;
use sea_orm::DatabaseConnection;

use crate::db::{connect_with_config, prepare};

/// Database connection and configuration tests
pub mod db_tests;



pub(crate) const TEST_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2VlZHNhbHQ$dGVzdGhhc2g";

/// Fresh in-memory database with the schema applied and the demo catalog loaded.
pub(crate) async fn setup_test_db() -> anyhow::Result<DatabaseConnection> {
    let cfg = DatabaseConfig::sqlite_memory();
    let db = connect_with_config(&cfg).await?;
    prepare(&db, &cfg, TEST_HASH).await?;
    Ok(db)
}
