use configs::DatabaseConfig;
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, DatabaseBackend, EntityTrait, PaginatorTrait, Statement};
use anyhow::Result;

use super::{setup_test_db, TEST_HASH};
use crate::db::connect_with_config;
use crate::{category, product, role, seed, user};

/// Test basic database connection
#[tokio::test]
async fn test_basic_connection() -> Result<()> {
    let db = connect_with_config(&DatabaseConfig::sqlite_memory()).await?;
    assert_eq!(db.get_database_backend(), DatabaseBackend::Sqlite);

    let stmt = Statement::from_string(DatabaseBackend::Sqlite, "SELECT 1 AS test".to_string());
    let row = db.query_one(stmt).await?.expect("one row");
    let test_value: i32 = row.try_get("", "test")?;
    assert_eq!(test_value, 1);
    Ok(())
}

/// Migrations can be rolled all the way back and re-applied
#[tokio::test]
async fn test_migrations_up_down() -> Result<()> {
    let db = connect_with_config(&DatabaseConfig::sqlite_memory()).await?;
    migration::Migrator::up(&db, None).await?;
    assert!(migration::Migrator::get_pending_migrations(&db).await?.is_empty());
    migration::Migrator::down(&db, None).await?;
    migration::Migrator::up(&db, None).await?;
    assert_eq!(product::Entity::find().count(&db).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_seed_populates_catalog_once() -> Result<()> {
    let db = setup_test_db().await?;
    assert_eq!(product::Entity::find().count(&db).await?, 25);
    assert_eq!(category::Entity::find().count(&db).await?, 3);
    assert_eq!(role::Entity::find().count(&db).await?, 2);
    assert_eq!(user::Entity::find().count(&db).await?, 2);

    let first = product::Entity::find_by_id(1).one(&db).await?.expect("product 1");
    assert_eq!(first.name, "The Lord of the Rings");

    // Second run is a no-op
    let summary = seed::seed_catalog(&db, TEST_HASH).await?;
    assert_eq!(summary, seed::SeedSummary::default());
    assert_eq!(product::Entity::find().count(&db).await?, 25);
    Ok(())
}
