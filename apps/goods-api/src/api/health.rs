//! Readiness endpoint

use axum::{http::StatusCode, routing::get, Json, Router};
use axum_helpers::{run_health_checks, HealthCheckFuture};
use serde_json::Value;

use crate::state::AppState;

async fn ready(state: AppState) -> (StatusCode, Json<Value>) {
    let upload_dir = state.images.root().to_path_buf();

    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![
        (
            "database",
            Box::pin(async {
                database::postgres::check_health(&state.db)
                    .await
                    .map_err(|e| e.to_string())
            }),
        ),
        (
            "storage",
            Box::pin(async move {
                match tokio::fs::metadata(&upload_dir).await {
                    Ok(meta) if meta.is_dir() => Ok(()),
                    Ok(_) => Err(format!("{} is not a directory", upload_dir.display())),
                    Err(e) => Err(format!("{}: {}", upload_dir.display(), e)),
                }
            }),
        ),
    ];

    run_health_checks(checks).await
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/ready", get(move || ready(state)))
}
