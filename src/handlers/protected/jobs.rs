// handlers/protected/jobs.rs - POST /jobs, PUT /jobs/:id, DELETE /jobs/:id

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::models::Job;
use crate::handlers::{json_body, path_id};
use crate::middleware::{ApiResponse, ApiResult, AuthAdmin};
use crate::validation::JobRequest;

/// POST /jobs - Create a job listing
pub async fn create(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthAdmin>,
    payload: Result<Json<JobRequest>, JsonRejection>,
) -> ApiResult<Job> {
    let input = state.validator.job(json_body(payload)?, Utc::now())?;
    let job = state.jobs.create(input, admin.admin_id).await?;
    Ok(ApiResponse::created(job))
}

/// PUT /jobs/:id - Replace every editable field of a job
///
/// The deadline has to fall after the job's original creation time.
pub async fn update(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthAdmin>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<JobRequest>, JsonRejection>,
) -> ApiResult<Job> {
    let id = path_id(id)?;
    let request = json_body(payload)?;
    let existing = state.jobs.get(id).await?;
    let input = state.validator.job(request, existing.created_at)?;
    let job = state.jobs.update(id, input, admin.admin_id).await?;
    Ok(ApiResponse::success(job))
}

/// DELETE /jobs/:id - Soft delete
pub async fn delete(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthAdmin>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Value> {
    let id = path_id(id)?;
    state.jobs.delete(id, admin.admin_id).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
