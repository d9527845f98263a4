//! Repository Module
//!
//! Free functions over SQLite. Functions taking `&SqlitePool` run on their
//! own; functions taking `&mut SqliteConnection` are building blocks that
//! callers compose inside one transaction (`&mut *tx`).

pub mod counter;
pub mod daily_sheet;
pub mod employee;
pub mod payroll;
pub mod task;
pub mod tipping;
pub mod truck;

use shared::error::{AppError, ErrorCode};
use sqlx::{Sqlite, SqlitePool, Transaction};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound(err.to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Conflict(msg) => AppError::conflict(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                AppError::database(msg)
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Open a write transaction holding the SQLite write lock from the start.
///
/// A deferred `BEGIN` that reads first cannot be upgraded once another
/// writer commits (`SQLITE_BUSY` regardless of `busy_timeout`); `IMMEDIATE`
/// waits for the lock instead, so read-then-write sequences serialize.
pub async fn begin_write(pool: &SqlitePool) -> RepoResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

/// Test database with migrations applied
#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    crate::db::DbService::in_memory().await.unwrap().pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unique_violation_maps_to_duplicate() {
        let pool = test_pool().await;
        let insert = "INSERT INTO counter (name, value) VALUES ('x', 1)";
        sqlx::query(insert).execute(&pool).await.unwrap();
        let err: RepoError = sqlx::query(insert).execute(&pool).await.unwrap_err().into();
        assert!(matches!(err, RepoError::Duplicate(_)));

        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::AlreadyExists);
    }

    #[tokio::test]
    async fn row_not_found_maps_to_not_found() {
        let pool = test_pool().await;
        let err: RepoError = sqlx::query("SELECT value FROM counter WHERE name = 'missing'")
            .fetch_one(&pool)
            .await
            .err()
            .unwrap()
            .into();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
