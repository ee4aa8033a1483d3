use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use dotenvy::dotenv;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use common::utils::logging::init_logging_default;
use service::catalog::password::hash_password;
use service::crud::CrudService;

use crate::errors::StartupError;
use crate::routes::{self, AppState};

/// Password given to the demo users when the catalog is seeded.
const DEMO_PASSWORD: &str = "123456";

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// TOML config when present, otherwise environment only.
pub fn load_config() -> Result<AppConfig, StartupError> {
    match AppConfig::load_and_validate() {
        Ok(cfg) => Ok(cfg),
        Err(e) => {
            warn!(error = %e, "config file unusable; falling back to environment");
            AppConfig::from_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))
        }
    }
}

/// Connect, migrate, optionally seed, and wire one service per resource.
pub async fn build_state(cfg: &AppConfig) -> Result<AppState, StartupError> {
    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    let demo_hash = hash_password(DEMO_PASSWORD).map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    models::db::prepare(&db, &cfg.database, &demo_hash)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    Ok(state_from_db(db, cfg))
}

pub fn state_from_db(db: DatabaseConnection, cfg: &AppConfig) -> AppState {
    let max = cfg.pagination.max_page_size;
    AppState {
        categories: Arc::new(CrudService::new(db.clone()).with_max_page_size(max)),
        products: Arc::new(CrudService::new(db.clone()).with_max_page_size(max)),
        users: Arc::new(CrudService::new(db).with_max_page_size(max)),
        pagination: cfg.pagination,
    }
}

pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let state = build_state(cfg).await?;
    Ok(routes::build_router(state, build_cors()))
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_default();

    let cfg = load_config()?;
    let app = build_app(&cfg).await?;

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, sqlite = cfg.database.is_sqlite(), "starting catalog server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("catalog server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
