// Runs against a live Postgres when DATABASE_URL is set; otherwise each test returns early.

use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Utc};
use sqlx::PgPool;

use desemprego_zero::config::DatabaseConfig;
use desemprego_zero::database::models::{JobInput, JobType, NewAdmin, NewCandidate};
use desemprego_zero::database::{
    manager, schema, DatabaseError, PgStore, Store, ENROLLMENT_UNIQUE_CONSTRAINT,
};
use desemprego_zero::services::{EnrollmentError, EnrollmentService};

async fn connect() -> Result<Option<(PgPool, PgStore)>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping Postgres test");
        return Ok(None);
    };

    let pool = manager::connect(&DatabaseConfig {
        url,
        max_connections: 5,
        connection_timeout: 10,
    })
    .await?;
    schema::ensure_schema(&pool).await?;

    Ok(Some((pool.clone(), PgStore::new(pool))))
}

/// Emails and usernames unique to one test run.
fn unique(prefix: &str) -> String {
    format!(
        "{}-{}@race.example.com",
        prefix,
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}

fn job_input() -> JobInput {
    JobInput {
        title: "Warehouse Assistant".to_string(),
        description: "Receive and organise donated goods".to_string(),
        company: "Banco de Alimentos".to_string(),
        location: "Campinas".to_string(),
        salary: "R$ 2.200".to_string(),
        job_type: JobType::FullTime,
        requirements: "Able to lift boxes and keep inventory".to_string(),
        deadline: Utc::now() + Duration::days(20),
        active: true,
    }
}

fn applicant(email: &str) -> NewCandidate {
    NewCandidate {
        name: "Pedro Santos".to_string(),
        email: email.to_string(),
        phone: "(19) 99876-5432".to_string(),
        resume: "Logistics assistant for four years".to_string(),
        experience: "Stock control and forklift operation".to_string(),
        education: "High school diploma".to_string(),
    }
}

async fn candidate_rows(pool: &PgPool, email: &str) -> Result<i64> {
    Ok(
        sqlx::query_scalar("SELECT COUNT(*) FROM candidates WHERE email = $1")
            .bind(email)
            .fetch_one(pool)
            .await?,
    )
}

async fn cleanup(pool: &PgPool, email: &str, job_id: i64) -> Result<()> {
    // Enrollments go with their candidates (ON DELETE CASCADE).
    sqlx::query("DELETE FROM candidates WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(job_id)
        .execute(pool)
        .await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_enrollments_hit_the_unique_constraint_once() -> Result<()> {
    let Some((pool, store)) = connect().await? else {
        return Ok(());
    };
    let job_id = store.create_job(job_input()).await?.id;
    let email = unique("store");

    let first = tokio::spawn({
        let (store, candidate) = (store.clone(), applicant(&email));
        async move { store.create_enrollment(&candidate, job_id).await }
    });
    let second = tokio::spawn({
        let (store, candidate) = (store.clone(), applicant(&email));
        async move { store.create_enrollment(&candidate, job_id).await }
    });
    let results = [first.await?, second.await?];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let violations = results
        .iter()
        .filter(|r| {
            matches!(r, Err(DatabaseError::UniqueViolation(c)) if c == ENROLLMENT_UNIQUE_CONSTRAINT)
        })
        .count();

    assert_eq!(successes, 1, "{:?}", results);
    assert_eq!(violations, 1, "{:?}", results);
    // The losing transaction rolled its candidate row back.
    assert_eq!(candidate_rows(&pool, &email).await?, 1);
    assert!(store.enrollment_exists(&email, job_id).await?);

    cleanup(&pool, &email, job_id).await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_applications_map_to_already_applied() -> Result<()> {
    let Some((pool, store)) = connect().await? else {
        return Ok(());
    };
    let job_id = store.create_job(job_input()).await?.id;
    let email = unique("service");
    let service = Arc::new(EnrollmentService::new(Arc::new(store)));

    let first = tokio::spawn({
        let (service, candidate) = (service.clone(), applicant(&email));
        async move { service.enroll(candidate, job_id).await }
    });
    let second = tokio::spawn({
        let (service, candidate) = (service.clone(), applicant(&email));
        async move { service.enroll(candidate, job_id).await }
    });
    let results = [first.await?, second.await?];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(EnrollmentError::AlreadyApplied)))
            .count(),
        1
    );
    assert_eq!(candidate_rows(&pool, &email).await?, 1);

    cleanup(&pool, &email, job_id).await
}

#[tokio::test]
async fn duplicate_admin_reports_constraint_name() -> Result<()> {
    let Some((pool, store)) = connect().await? else {
        return Ok(());
    };
    let email = unique("admin");
    let admin = NewAdmin {
        username: email.clone(),
        email: email.clone(),
        password_hash: "not-a-real-hash".to_string(),
    };

    store.create_admin(admin.clone()).await?;
    let err = store.create_admin(admin).await.unwrap_err();
    assert!(matches!(err, DatabaseError::UniqueViolation(ref c) if c == "admins_username_key"));

    sqlx::query("DELETE FROM admins WHERE email = $1")
        .bind(&email)
        .execute(&pool)
        .await?;
    Ok(())
}

#[tokio::test]
async fn soft_deleted_job_is_invisible() -> Result<()> {
    let Some((pool, store)) = connect().await? else {
        return Ok(());
    };
    let job = store.create_job(job_input()).await?;

    assert!(store.find_job(job.id).await?.is_some());
    assert!(store.soft_delete_job(job.id).await?);
    assert!(!store.soft_delete_job(job.id).await?);
    assert!(store.find_job(job.id).await?.is_none());
    assert!(store.update_job(job.id, job_input()).await?.is_none());
    assert!(store.list_active_jobs().await?.iter().all(|j| j.id != job.id));

    sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(job.id)
        .execute(&pool)
        .await?;
    Ok(())
}
