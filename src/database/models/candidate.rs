use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::job::Job;

/// One application's applicant profile. A new row is written per application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub resume: String,
    pub experience: String,
    pub education: String,
    pub created_at: DateTime<Utc>,
}

/// Structurally validated applicant payload. `email` is already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCandidate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub resume: String,
    pub experience: String,
    pub education: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateWithJobs {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub jobs: Vec<Job>,
}
