use std::time::Duration;

use configs::DatabaseConfig;
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

const IN_MEMORY_KEEPALIVE: Duration = Duration::from_secs(10 * 365 * 24 * 3600);

/// Open a pooled connection using the `[database]` section.
///
/// In-memory SQLite lives inside a single connection, so the pool is pinned
/// to exactly one connection for such URLs.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(cfg.url.clone());
    let in_memory = cfg.url.contains(":memory:");
    let (min, max) = if in_memory { (1, 1) } else { (cfg.min_connections, cfg.max_connections) };
    // the database dies with its connection, so it must never be recycled
    let (idle, lifetime) = if in_memory {
        (IN_MEMORY_KEEPALIVE, IN_MEMORY_KEEPALIVE)
    } else {
        (Duration::from_secs(cfg.idle_timeout_secs), Duration::from_secs(cfg.max_lifetime_secs))
    };
    opt.max_connections(max)
        .min_connections(min)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .idle_timeout(idle)
        .max_lifetime(lifetime)
        .sqlx_logging(cfg.sqlx_logging);
    let db = Database::connect(opt).await?;
    info!(max_connections = max, sqlite = cfg.is_sqlite(), "database pool ready");
    Ok(db)
}

/// Run pending migrations and, when enabled, seed the demo catalog.
pub async fn prepare(db: &DatabaseConnection, cfg: &DatabaseConfig, demo_password_hash: &str) -> anyhow::Result<()> {
    if cfg.run_migrations {
        migration::Migrator::up(db, None).await?;
        info!("migrations applied");
    }
    if cfg.seed_demo_data {
        crate::seed::seed_catalog(db, demo_password_hash).await?;
    }
    Ok(())
}
