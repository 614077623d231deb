use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use crate::database::models::{CandidateWithJobs, NewCandidate};
use crate::database::{DatabaseError, Store};

#[derive(Debug, Error)]
pub enum EnrollmentError {
    #[error("job {0} not found")]
    JobNotFound(i64),

    #[error("candidate already applied to this job")]
    AlreadyApplied,

    #[error(transparent)]
    Persistence(#[from] DatabaseError),
}

/// Applies candidates to jobs, at most once per `(email, job)`.
pub struct EnrollmentService {
    store: Arc<dyn Store>,
}

impl EnrollmentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Single-shot: job lookup, duplicate fast path, then the atomic create-and-link.
    /// A unique-constraint violation from the store is the authoritative duplicate signal.
    pub async fn enroll(
        &self,
        candidate: NewCandidate,
        job_id: i64,
    ) -> Result<CandidateWithJobs, EnrollmentError> {
        let job = self
            .store
            .find_job(job_id)
            .await?
            .ok_or(EnrollmentError::JobNotFound(job_id))?;

        if self.store.enrollment_exists(&candidate.email, job.id).await? {
            return Err(EnrollmentError::AlreadyApplied);
        }

        let created = match self.store.create_enrollment(&candidate, job.id).await {
            Ok(created) => created,
            Err(DatabaseError::UniqueViolation(constraint)) => {
                info!(
                    "Concurrent duplicate application to job {} rejected by {}",
                    job.id, constraint
                );
                return Err(EnrollmentError::AlreadyApplied);
            }
            Err(err) => {
                error!("Enrollment to job {} rolled back: {}", job.id, err);
                return Err(EnrollmentError::Persistence(err));
            }
        };

        info!("Candidate {} applied to job {}", created.id, job.id);
        Ok(CandidateWithJobs {
            candidate: created,
            jobs: vec![job],
        })
    }

    pub async fn list_candidates(&self) -> Result<Vec<CandidateWithJobs>, EnrollmentError> {
        Ok(self.store.list_candidates().await?)
    }
}
