// handlers/public/jobs.rs - GET /jobs, GET /jobs/:id

use axum::extract::{rejection::PathRejection, Path, State};

use crate::app::AppState;
use crate::database::models::Job;
use crate::handlers::path_id;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /jobs - Active, non-deleted jobs, newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Job>> {
    Ok(ApiResponse::success(state.jobs.list_active().await?))
}

/// GET /jobs/:id - Any non-deleted job, active or not
pub async fn get(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Job> {
    let id = path_id(id)?;
    Ok(ApiResponse::success(state.jobs.get(id).await?))
}
