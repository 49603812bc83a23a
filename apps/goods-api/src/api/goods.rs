//! Goods API routes

use axum::Router;
use domain_goods::{handlers, GoodService, PgGoodRepository};
use std::sync::Arc;

use crate::state::AppState;

/// Create goods router
pub fn router(state: &AppState) -> Router {
    let repository = PgGoodRepository::new(state.db.clone());
    let service = GoodService::new(repository, Arc::clone(&state.images));
    handlers::router(service)
}
