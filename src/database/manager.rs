use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors surfaced by every [`Store`](super::Store) implementation.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A unique constraint rejected the write. Carries the constraint name.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Failure raised by the in-process [`MemoryStore`](super::MemoryStore); Postgres
    /// failures arrive as [`DatabaseError::Sqlx`].
    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return DatabaseError::UniqueViolation(constraint);
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Open the shared connection pool.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect(&config.url)
        .await?;

    info!(
        "Created database pool (max_connections={})",
        config.max_connections
    );
    Ok(pool)
}

/// Pings the pool to ensure connectivity
pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_stay_sqlx() {
        let err = DatabaseError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, DatabaseError::Sqlx(sqlx::Error::RowNotFound)));
        assert!(!matches!(err, DatabaseError::UniqueViolation(_)));
    }

    #[test]
    fn unique_violation_is_distinguishable() {
        let err = DatabaseError::UniqueViolation("enrollments_email_job_key".to_string());
        assert_eq!(
            err.to_string(),
            "Unique constraint violated: enrollments_email_job_key"
        );
    }
}
