// handlers/public/auth.rs - POST /admin/login

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::Utc;

use crate::app::AppState;
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::LoginOutcome;
use crate::validation::LoginRequest;

/// POST /admin/login - Exchange admin credentials for a bearer token
///
/// Expected Input: `{"username": "admin", "password": "..."}` or the same with `email`.
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": {
///     "token": "eyJhbGciOiJIUzI1NiI...",
///     "expires_at": "2026-01-02T10:00:00Z",
///     "admin": { "id": 1, "username": "admin", "email": "admin@example.com" }
///   }
/// }
/// ```
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginOutcome> {
    let credentials = state.validator.login(json_body(payload)?)?;
    let outcome = state.auth.login(credentials, Utc::now()).await?;
    Ok(ApiResponse::success(outcome))
}
