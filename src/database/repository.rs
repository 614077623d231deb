use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Admin, AdminLookup, Candidate, CandidateWithJobs, Job, JobInput, NewAdmin, NewCandidate,
};

/// Name of the unique constraint over `(candidate_email, job_id)`.
pub const ENROLLMENT_UNIQUE_CONSTRAINT: &str = "enrollments_email_job_key";

/// Persistence interface consumed by the services.
///
/// Soft-deleted jobs are invisible to every read and write here except
/// [`Store::soft_delete_job`] itself.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_admin(&self, lookup: &AdminLookup) -> Result<Option<Admin>, DatabaseError>;

    /// Fails with [`DatabaseError::UniqueViolation`] on a taken username or email.
    async fn create_admin(&self, admin: NewAdmin) -> Result<Admin, DatabaseError>;

    /// Active, non-deleted jobs, newest first.
    async fn list_active_jobs(&self) -> Result<Vec<Job>, DatabaseError>;

    async fn find_job(&self, id: i64) -> Result<Option<Job>, DatabaseError>;

    async fn create_job(&self, job: JobInput) -> Result<Job, DatabaseError>;

    /// `None` when the job does not exist or was deleted.
    async fn update_job(&self, id: i64, job: JobInput) -> Result<Option<Job>, DatabaseError>;

    /// `false` when the job does not exist or was already deleted.
    async fn soft_delete_job(&self, id: i64) -> Result<bool, DatabaseError>;

    async fn enrollment_exists(&self, email: &str, job_id: i64) -> Result<bool, DatabaseError>;

    /// Insert the candidate and its enrollment as one unit: either both rows become visible
    /// or neither does. An existing `(email, job_id)` pair yields
    /// [`DatabaseError::UniqueViolation`] carrying [`ENROLLMENT_UNIQUE_CONSTRAINT`].
    async fn create_enrollment(
        &self,
        candidate: &NewCandidate,
        job_id: i64,
    ) -> Result<Candidate, DatabaseError>;

    async fn list_candidates(&self) -> Result<Vec<CandidateWithJobs>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
