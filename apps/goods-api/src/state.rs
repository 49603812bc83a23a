//! Application state management

use domain_goods::LocalImageStore;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub db: DatabaseConnection,
    pub images: Arc<LocalImageStore>,
}
