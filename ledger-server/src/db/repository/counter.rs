//! Counter Repository
//!
//! Named monotonic counters. One `UPDATE ... RETURNING` per allocation, so
//! two concurrent callers can never read the same value.

use super::{RepoError, RepoResult};
use sqlx::SqliteConnection;

pub const TASK_ORDER_NUMBER: &str = "task_order_number";

/// Allocate the next value of counter `name`
pub async fn next_value(conn: &mut SqliteConnection, name: &str) -> RepoResult<i64> {
    sqlx::query_scalar::<_, i64>("UPDATE counter SET value = value + 1 WHERE name = ? RETURNING value")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Counter {name} not found")))
}
