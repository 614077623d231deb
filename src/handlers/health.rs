// handlers/health.rs - GET /health

use axum::extract::State;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /health - Liveness plus a database round trip
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    if let Err(e) = state.store.health_check().await {
        tracing::error!("Health check failed: {}", e);
        return Err(ApiError::service_unavailable("database unavailable"));
    }

    Ok(ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "database": "ok"
    })))
}
