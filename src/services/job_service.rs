use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::database::models::{Job, JobInput};
use crate::database::{DatabaseError, Store};

#[derive(Debug, Error)]
pub enum JobError {
    #[error("job {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Persistence(#[from] DatabaseError),
}

/// Job listing management. Deletion is soft: the row keeps its data and gets a
/// `deleted_at` timestamp, after which no read or write here can see it.
pub struct JobService {
    store: Arc<dyn Store>,
}

impl JobService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list_active(&self) -> Result<Vec<Job>, JobError> {
        Ok(self.store.list_active_jobs().await?)
    }

    pub async fn get(&self, id: i64) -> Result<Job, JobError> {
        self.store.find_job(id).await?.ok_or(JobError::NotFound(id))
    }

    pub async fn create(&self, input: JobInput, admin_id: i64) -> Result<Job, JobError> {
        let job = self.store.create_job(input).await?;
        info!("Admin {} created job {}", admin_id, job.id);
        Ok(job)
    }

    pub async fn update(&self, id: i64, input: JobInput, admin_id: i64) -> Result<Job, JobError> {
        let job = self
            .store
            .update_job(id, input)
            .await?
            .ok_or(JobError::NotFound(id))?;
        info!("Admin {} updated job {}", admin_id, job.id);
        Ok(job)
    }

    pub async fn delete(&self, id: i64, admin_id: i64) -> Result<(), JobError> {
        if !self.store.soft_delete_job(id).await? {
            return Err(JobError::NotFound(id));
        }
        info!("Admin {} deleted job {}", admin_id, id);
        Ok(())
    }
}
