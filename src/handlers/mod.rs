// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (admin bearer token, see middleware::require_admin)

pub mod health;
pub mod protected;
pub mod public;

use std::collections::HashMap;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::Json;

use crate::error::ApiError;

/// Unwrap a JSON body, turning extractor rejections into the API error envelope.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err(ApiError::invalid_json(rejection.body_text())),
    }
}

/// Unwrap a numeric `:id` path segment; `/jobs/abc` becomes a 400 in the usual envelope.
pub(crate) fn path_id(param: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    match param {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => {
            let mut field_errors = HashMap::new();
            field_errors.insert("id".to_string(), rejection.body_text());
            Err(ApiError::validation_error("Invalid path parameter", Some(field_errors)))
        }
    }
}
