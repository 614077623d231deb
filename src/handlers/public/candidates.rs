// handlers/public/candidates.rs - POST /candidates

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::app::AppState;
use crate::database::models::CandidateWithJobs;
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::CandidateRequest;

/// POST /candidates - Apply to a job
///
/// One application per email and job: a repeat answers 409 even when two requests race.
pub async fn enroll(
    State(state): State<AppState>,
    payload: Result<Json<CandidateRequest>, JsonRejection>,
) -> ApiResult<CandidateWithJobs> {
    let (candidate, job_id) = state.validator.candidate(json_body(payload)?)?;
    let enrolled = state.enrollment.enroll(candidate, job_id).await?;
    Ok(ApiResponse::created(enrolled))
}
