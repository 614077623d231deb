// handlers/protected/candidates.rs - GET /candidates

use axum::extract::State;

use crate::app::AppState;
use crate::database::models::CandidateWithJobs;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /candidates - Every application with the jobs it is linked to
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<CandidateWithJobs>> {
    Ok(ApiResponse::success(state.enrollment.list_candidates().await?))
}
