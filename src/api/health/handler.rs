//! Health check handler

use axum::Json;
use serde_json::{Value, json};

/// GET /api/health - public liveness probe
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
