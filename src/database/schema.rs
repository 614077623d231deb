use sqlx::PgPool;
use tracing::info;

use crate::database::manager::DatabaseError;

/// Idempotent DDL, applied in order at startup.
const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS admins (
        id            BIGSERIAL PRIMARY KEY,
        username      TEXT NOT NULL,
        email         TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT admins_username_key UNIQUE (username),
        CONSTRAINT admins_email_key UNIQUE (email)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id           BIGSERIAL PRIMARY KEY,
        title        TEXT NOT NULL,
        description  TEXT NOT NULL,
        company      TEXT NOT NULL,
        location     TEXT NOT NULL,
        salary       TEXT NOT NULL,
        job_type     TEXT NOT NULL,
        requirements TEXT NOT NULL,
        deadline     TIMESTAMPTZ NOT NULL,
        active       BOOLEAN NOT NULL DEFAULT TRUE,
        created_at   TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at   TIMESTAMPTZ NOT NULL DEFAULT now(),
        deleted_at   TIMESTAMPTZ
    )
    "#,
    "CREATE INDEX IF NOT EXISTS jobs_listing_idx ON jobs (created_at DESC) WHERE active AND deleted_at IS NULL",
    r#"
    CREATE TABLE IF NOT EXISTS candidates (
        id         BIGSERIAL PRIMARY KEY,
        name       TEXT NOT NULL,
        email      TEXT NOT NULL,
        phone      TEXT NOT NULL,
        resume     TEXT NOT NULL,
        experience TEXT NOT NULL,
        education  TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS enrollments (
        candidate_id    BIGINT NOT NULL REFERENCES candidates (id) ON DELETE CASCADE,
        job_id          BIGINT NOT NULL REFERENCES jobs (id),
        candidate_email TEXT NOT NULL,
        created_at      TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (candidate_id, job_id),
        CONSTRAINT enrollments_email_job_key UNIQUE (candidate_email, job_id)
    )
    "#,
];

pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema ensured ({} statements)", STATEMENTS.len());
    Ok(())
}
