//! Goods API - REST server for the catalog's goods

use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_goods::LocalImageStore;
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("Connecting to PostgreSQL");
    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await?;

    if config.run_migrations {
        database::postgres::run_migrations::<migration::Migrator>(&db, config.app.name).await?;
    } else {
        info!("Skipping migrations (RUN_MIGRATIONS=false)");
    }

    let storage = config.storage.clone();
    tokio::fs::create_dir_all(&storage.upload_dir).await?;
    info!(
        "Storing images in {} served from {}",
        storage.upload_dir.display(),
        storage.public_url
    );

    let state = AppState {
        config: config.clone(),
        db,
        images: Arc::new(LocalImageStore::new(
            storage.upload_dir.clone(),
            storage.public_url.clone(),
        )),
    };

    let api_routes = api::routes(&state);
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;
    let mut app = router.merge(health_router(state.config.app));

    // absolute URLs point at an external server; only a local path prefix is served here
    if storage.public_url.starts_with('/') && storage.public_url != "/" {
        app = app.nest_service(&storage.public_url, ServeDir::new(&storage.upload_dir));
    }

    info!("Starting Goods API on port {}", state.config.server.port);

    let server_config = state.config.server.clone();
    create_production_app(app, &server_config, Duration::from_secs(30), async move {
        info!("Shutting down: closing PostgreSQL pool");
        if let Err(e) = state.db.close().await {
            tracing::warn!("Error closing PostgreSQL pool: {}", e);
        }
        info!("PostgreSQL pool closed");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Goods API shutdown complete");
    Ok(())
}
