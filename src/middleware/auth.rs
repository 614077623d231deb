use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated admin context extracted from the bearer token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthAdmin {
    pub admin_id: i64,
}

/// Rejects the request with 401 unless it carries a valid admin token, then injects
/// [`AuthAdmin`] into the request extensions for the handler.
pub async fn require_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(|msg| {
        tracing::warn!("Rejected {} {}: {}", request.method(), request.uri().path(), msg);
        ApiError::unauthorized(msg)
    })?;

    let admin_id = state.tokens.verify(&token, Utc::now()).map_err(|err| {
        tracing::warn!("Rejected {} {}: {}", request.method(), request.uri().path(), err);
        ApiError::from(err)
    })?;

    request.extensions_mut().insert(AuthAdmin { admin_id });

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if token.trim().is_empty() => Err("Empty bearer token"),
        Some(token) => Ok(token.trim().to_string()),
        None => Err("Authorization header must use Bearer token format"),
    }
}
