//! Liveness endpoints.

use axum::{response::IntoResponse, Json};

pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "mindforge-api",
        "status": "ok",
    }))
}

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
