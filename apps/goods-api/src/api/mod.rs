//! API routes module

pub mod goods;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/goods", goods::router(state))
        .merge(health::router(state.clone()))
}
