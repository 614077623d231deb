use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::database::manager::{self, DatabaseError};
use crate::database::models::{
    Admin, AdminLookup, Candidate, CandidateWithJobs, Job, JobInput, NewAdmin, NewCandidate,
};
use crate::database::repository::{Store, ENROLLMENT_UNIQUE_CONSTRAINT};

const ADMIN_COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at";

const JOB_COLUMNS: &str = "id, title, description, company, location, salary, job_type, \
                           requirements, deadline, active, created_at, updated_at, deleted_at";

const CANDIDATE_COLUMNS: &str =
    "id, name, email, phone, resume, experience, education, created_at";

/// Postgres-backed [`Store`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct EnrolledJobRow {
    candidate_id: i64,
    #[sqlx(flatten)]
    job: Job,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_admin(&self, lookup: &AdminLookup) -> Result<Option<Admin>, DatabaseError> {
        let (column, value) = match lookup {
            AdminLookup::Username(username) => ("username", username),
            AdminLookup::Email(email) => ("email", email),
        };
        let sql = format!("SELECT {} FROM admins WHERE {} = $1", ADMIN_COLUMNS, column);

        let admin = sqlx::query_as::<_, Admin>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(admin)
    }

    async fn create_admin(&self, admin: NewAdmin) -> Result<Admin, DatabaseError> {
        let sql = format!(
            "INSERT INTO admins (username, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            ADMIN_COLUMNS
        );

        let admin = sqlx::query_as::<_, Admin>(&sql)
            .bind(&admin.username)
            .bind(&admin.email)
            .bind(&admin.password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(admin)
    }

    async fn list_active_jobs(&self) -> Result<Vec<Job>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM jobs WHERE active AND deleted_at IS NULL ORDER BY created_at DESC, id DESC",
            JOB_COLUMNS
        );

        let jobs = sqlx::query_as::<_, Job>(&sql).fetch_all(&self.pool).await?;
        Ok(jobs)
    }

    async fn find_job(&self, id: i64) -> Result<Option<Job>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM jobs WHERE id = $1 AND deleted_at IS NULL",
            JOB_COLUMNS
        );

        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(job)
    }

    async fn create_job(&self, job: JobInput) -> Result<Job, DatabaseError> {
        let sql = format!(
            r#"
            INSERT INTO jobs (title, description, company, location, salary, job_type,
                              requirements, deadline, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            JOB_COLUMNS
        );

        let created = sqlx::query_as::<_, Job>(&sql)
            .bind(&job.title)
            .bind(&job.description)
            .bind(&job.company)
            .bind(&job.location)
            .bind(&job.salary)
            .bind(job.job_type.as_str())
            .bind(&job.requirements)
            .bind(job.deadline)
            .bind(job.active)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update_job(&self, id: i64, job: JobInput) -> Result<Option<Job>, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE jobs
            SET title = $1, description = $2, company = $3, location = $4, salary = $5,
                job_type = $6, requirements = $7, deadline = $8, active = $9,
                updated_at = now()
            WHERE id = $10 AND deleted_at IS NULL
            RETURNING {}
            "#,
            JOB_COLUMNS
        );

        let updated = sqlx::query_as::<_, Job>(&sql)
            .bind(&job.title)
            .bind(&job.description)
            .bind(&job.company)
            .bind(&job.location)
            .bind(&job.salary)
            .bind(job.job_type.as_str())
            .bind(&job.requirements)
            .bind(job.deadline)
            .bind(job.active)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn soft_delete_job(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE jobs SET deleted_at = now(), updated_at = now() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn enrollment_exists(&self, email: &str, job_id: i64) -> Result<bool, DatabaseError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM enrollments WHERE candidate_email = $1 AND job_id = $2)",
        )
        .bind(email)
        .bind(job_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create_enrollment(
        &self,
        candidate: &NewCandidate,
        job_id: i64,
    ) -> Result<Candidate, DatabaseError> {
        // Dropping `tx` without commit rolls back, so every early return below leaves
        // neither the candidate nor the enrollment behind.
        let mut tx = self.pool.begin().await?;

        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM enrollments WHERE candidate_email = $1 AND job_id = $2)",
        )
        .bind(&candidate.email)
        .bind(job_id)
        .fetch_one(&mut *tx)
        .await?;
        if taken {
            return Err(DatabaseError::UniqueViolation(
                ENROLLMENT_UNIQUE_CONSTRAINT.to_string(),
            ));
        }

        let sql = format!(
            r#"
            INSERT INTO candidates (name, email, phone, resume, experience, education)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            CANDIDATE_COLUMNS
        );
        let created = sqlx::query_as::<_, Candidate>(&sql)
            .bind(&candidate.name)
            .bind(&candidate.email)
            .bind(&candidate.phone)
            .bind(&candidate.resume)
            .bind(&candidate.experience)
            .bind(&candidate.education)
            .fetch_one(&mut *tx)
            .await?;

        // The unique constraint is what settles concurrent submissions of the same pair;
        // the EXISTS check above only spares the insert in the common case.
        sqlx::query(
            "INSERT INTO enrollments (candidate_id, job_id, candidate_email) VALUES ($1, $2, $3)",
        )
        .bind(created.id)
        .bind(job_id)
        .bind(&created.email)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateWithJobs>, DatabaseError> {
        let sql = format!("SELECT {} FROM candidates ORDER BY id", CANDIDATE_COLUMNS);
        let candidates = sqlx::query_as::<_, Candidate>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let sql = format!(
            r#"
            SELECT e.candidate_id, {}
            FROM enrollments e
            JOIN jobs ON jobs.id = e.job_id
            WHERE jobs.deleted_at IS NULL
            ORDER BY e.candidate_id, jobs.id
            "#,
            qualified_job_columns()
        );
        let rows = sqlx::query_as::<_, EnrolledJobRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let mut jobs_by_candidate: HashMap<i64, Vec<Job>> = HashMap::new();
        for row in rows {
            jobs_by_candidate
                .entry(row.candidate_id)
                .or_default()
                .push(row.job);
        }

        Ok(candidates
            .into_iter()
            .map(|candidate| {
                let jobs = jobs_by_candidate.remove(&candidate.id).unwrap_or_default();
                CandidateWithJobs { candidate, jobs }
            })
            .collect())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        manager::health_check(&self.pool).await
    }
}

fn qualified_job_columns() -> String {
    JOB_COLUMNS
        .split(',')
        .map(|column| format!("jobs.{}", column.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
