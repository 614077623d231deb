use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Admin, AdminLookup, Candidate, CandidateWithJobs, Job, JobInput, NewAdmin, NewCandidate,
};
use crate::database::repository::{Store, ENROLLMENT_UNIQUE_CONSTRAINT};

/// In-process [`Store`] with the same constraints as the Postgres schema.
///
/// Every write happens under a single lock, so the enrollment uniqueness check and the
/// insert are one step, the way the database constraint makes them one step.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    fail_next_link: AtomicBool,
    unavailable: AtomicBool,
}

#[derive(Default)]
struct State {
    next_admin_id: i64,
    next_job_id: i64,
    next_candidate_id: i64,
    admins: Vec<Admin>,
    jobs: BTreeMap<i64, Job>,
    candidates: BTreeMap<i64, Candidate>,
    /// `(candidate_id, job_id)` in insertion order.
    enrollments: Vec<(i64, i64)>,
    enrollment_keys: HashSet<(String, i64)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next enrollment fail after its candidate row was written, as a broken
    /// connection between the two inserts would.
    pub fn fail_next_enrollment_link(&self) {
        self.fail_next_link.store(true, Ordering::SeqCst);
    }

    /// Make [`Store::health_check`] fail until switched back, as an unreachable database would.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn candidate_count(&self) -> usize {
        self.state.read().await.candidates.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_admin(&self, lookup: &AdminLookup) -> Result<Option<Admin>, DatabaseError> {
        let state = self.state.read().await;
        let found = state.admins.iter().find(|admin| match lookup {
            AdminLookup::Username(username) => &admin.username == username,
            AdminLookup::Email(email) => &admin.email == email,
        });
        Ok(found.cloned())
    }

    async fn create_admin(&self, admin: NewAdmin) -> Result<Admin, DatabaseError> {
        let mut state = self.state.write().await;
        if state.admins.iter().any(|a| a.username == admin.username) {
            return Err(DatabaseError::UniqueViolation("admins_username_key".to_string()));
        }
        if state.admins.iter().any(|a| a.email == admin.email) {
            return Err(DatabaseError::UniqueViolation("admins_email_key".to_string()));
        }

        state.next_admin_id += 1;
        let now = Utc::now();
        let created = Admin {
            id: state.next_admin_id,
            username: admin.username,
            email: admin.email,
            password_hash: admin.password_hash,
            created_at: now,
            updated_at: now,
        };
        state.admins.push(created.clone());
        Ok(created)
    }

    async fn list_active_jobs(&self) -> Result<Vec<Job>, DatabaseError> {
        let state = self.state.read().await;
        let mut jobs: Vec<Job> = state
            .jobs
            .values()
            .filter(|job| job.active && job.deleted_at.is_none())
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(jobs)
    }

    async fn find_job(&self, id: i64) -> Result<Option<Job>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .jobs
            .get(&id)
            .filter(|job| job.deleted_at.is_none())
            .cloned())
    }

    async fn create_job(&self, job: JobInput) -> Result<Job, DatabaseError> {
        let mut state = self.state.write().await;
        state.next_job_id += 1;
        let now = Utc::now();
        let created = Job {
            id: state.next_job_id,
            title: job.title,
            description: job.description,
            company: job.company,
            location: job.location,
            salary: job.salary,
            job_type: job.job_type.as_str().to_string(),
            requirements: job.requirements,
            deadline: job.deadline,
            active: job.active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.jobs.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_job(&self, id: i64, job: JobInput) -> Result<Option<Job>, DatabaseError> {
        let mut state = self.state.write().await;
        let Some(existing) = state.jobs.get_mut(&id).filter(|j| j.deleted_at.is_none()) else {
            return Ok(None);
        };

        existing.title = job.title;
        existing.description = job.description;
        existing.company = job.company;
        existing.location = job.location;
        existing.salary = job.salary;
        existing.job_type = job.job_type.as_str().to_string();
        existing.requirements = job.requirements;
        existing.deadline = job.deadline;
        existing.active = job.active;
        existing.updated_at = Utc::now();
        Ok(Some(existing.clone()))
    }

    async fn soft_delete_job(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        match state.jobs.get_mut(&id).filter(|j| j.deleted_at.is_none()) {
            Some(job) => {
                let now = Utc::now();
                job.deleted_at = Some(now);
                job.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn enrollment_exists(&self, email: &str, job_id: i64) -> Result<bool, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.enrollment_keys.contains(&(email.to_string(), job_id)))
    }

    async fn create_enrollment(
        &self,
        candidate: &NewCandidate,
        job_id: i64,
    ) -> Result<Candidate, DatabaseError> {
        let mut state = self.state.write().await;

        if !state.jobs.contains_key(&job_id) {
            return Err(DatabaseError::QueryError(format!(
                "enrollment references unknown job {}",
                job_id
            )));
        }
        let key = (candidate.email.clone(), job_id);
        if state.enrollment_keys.contains(&key) {
            return Err(DatabaseError::UniqueViolation(
                ENROLLMENT_UNIQUE_CONSTRAINT.to_string(),
            ));
        }

        state.next_candidate_id += 1;
        let created = Candidate {
            id: state.next_candidate_id,
            name: candidate.name.clone(),
            email: candidate.email.clone(),
            phone: candidate.phone.clone(),
            resume: candidate.resume.clone(),
            experience: candidate.experience.clone(),
            education: candidate.education.clone(),
            created_at: Utc::now(),
        };
        state.candidates.insert(created.id, created.clone());

        if self.fail_next_link.swap(false, Ordering::SeqCst) {
            // Roll the candidate row back.
            state.candidates.remove(&created.id);
            state.next_candidate_id -= 1;
            return Err(DatabaseError::QueryError(
                "connection lost while linking candidate to job".to_string(),
            ));
        }

        state.enrollments.push((created.id, job_id));
        state.enrollment_keys.insert(key);
        Ok(created)
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateWithJobs>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .candidates
            .values()
            .map(|candidate| {
                let mut jobs: Vec<Job> = state
                    .enrollments
                    .iter()
                    .filter(|(candidate_id, _)| *candidate_id == candidate.id)
                    .filter_map(|(_, job_id)| state.jobs.get(job_id))
                    .filter(|job| job.deleted_at.is_none())
                    .cloned()
                    .collect();
                jobs.sort_by_key(|job| job.id);
                CandidateWithJobs {
                    candidate: candidate.clone(),
                    jobs,
                }
            })
            .collect())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DatabaseError::QueryError("database unreachable".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::JobType;
    use chrono::Duration;

    fn job_input(title: &str) -> JobInput {
        JobInput {
            title: title.to_string(),
            description: "Build and run the payroll platform".to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            salary: "R$ 8.000".to_string(),
            job_type: JobType::FullTime,
            requirements: "Five years of backend experience".to_string(),
            deadline: Utc::now() + Duration::days(30),
            active: true,
        }
    }

    fn applicant(email: &str) -> NewCandidate {
        NewCandidate {
            name: "Ana Souza".to_string(),
            email: email.to_string(),
            phone: "(11) 91234-5678".to_string(),
            resume: "Backend engineer since 2015".to_string(),
            experience: "Ten years shipping services".to_string(),
            education: "BSc Computer Science".to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_admin_is_unique_violation() {
        let store = MemoryStore::new();
        let admin = NewAdmin {
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: "x".to_string(),
        };
        store.create_admin(admin.clone()).await.unwrap();

        let err = store.create_admin(admin).await.unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation(ref c) if c == "admins_username_key"));
    }

    #[tokio::test]
    async fn soft_deleted_jobs_are_hidden() {
        let store = MemoryStore::new();
        let job = store.create_job(job_input("Backend Engineer")).await.unwrap();

        assert!(store.soft_delete_job(job.id).await.unwrap());
        assert!(!store.soft_delete_job(job.id).await.unwrap());
        assert!(store.find_job(job.id).await.unwrap().is_none());
        assert!(store.list_active_jobs().await.unwrap().is_empty());
        assert!(store
            .update_job(job.id, job_input("Renamed"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn inactive_jobs_are_not_listed_but_readable() {
        let store = MemoryStore::new();
        let mut input = job_input("Data Analyst");
        input.active = false;
        let job = store.create_job(input).await.unwrap();

        assert!(store.list_active_jobs().await.unwrap().is_empty());
        assert_eq!(store.find_job(job.id).await.unwrap().map(|j| j.id), Some(job.id));
    }

    #[tokio::test]
    async fn second_enrollment_of_pair_violates_constraint() {
        let store = MemoryStore::new();
        let job = store.create_job(job_input("Backend Engineer")).await.unwrap();

        store
            .create_enrollment(&applicant("a@b.com"), job.id)
            .await
            .unwrap();
        let err = store
            .create_enrollment(&applicant("a@b.com"), job.id)
            .await
            .unwrap_err();

        assert!(matches!(err, DatabaseError::UniqueViolation(ref c) if c == ENROLLMENT_UNIQUE_CONSTRAINT));
        assert_eq!(store.candidate_count().await, 1);
    }

    #[tokio::test]
    async fn failed_link_leaves_no_candidate() {
        let store = MemoryStore::new();
        let job = store.create_job(job_input("Backend Engineer")).await.unwrap();

        store.fail_next_enrollment_link();
        assert!(store
            .create_enrollment(&applicant("a@b.com"), job.id)
            .await
            .is_err());
        assert_eq!(store.candidate_count().await, 0);
        assert!(!store.enrollment_exists("a@b.com", job.id).await.unwrap());

        // The failure is one-shot; the retry goes through.
        store
            .create_enrollment(&applicant("a@b.com"), job.id)
            .await
            .unwrap();
        assert_eq!(store.candidate_count().await, 1);
    }
}
