//! Tipping Request Repository

use super::{RepoError, RepoResult};
use shared::models::{TippingRequest, TippingRequestCreate};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, driver_id, truck_id, site_name, weight_kg, cost, note, created_at";

pub async fn find_by_id<'e>(
    db: impl SqliteExecutor<'e>,
    id: i64,
) -> RepoResult<Option<TippingRequest>> {
    let sql = format!("SELECT {COLUMNS} FROM tipping_request WHERE id = ?");
    let request = sqlx::query_as::<_, TippingRequest>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(request)
}

pub async fn find_by_ids<'e>(
    db: impl SqliteExecutor<'e>,
    ids: &[i64],
) -> RepoResult<Vec<TippingRequest>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM tipping_request WHERE id IN ("));
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
    let requests = qb.build_query_as::<TippingRequest>().fetch_all(db).await?;
    Ok(requests)
}

pub async fn create(pool: &SqlitePool, data: &TippingRequestCreate) -> RepoResult<TippingRequest> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO tipping_request (id, driver_id, truck_id, site_name, weight_kg, cost, note, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(data.driver_id)
    .bind(data.truck_id)
    .bind(&data.site_name)
    .bind(data.weight_kg)
    .bind(data.cost)
    .bind(&data.note)
    .bind(shared::util::now_millis())
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create tipping request".into()))
}

/// Requests a driver created in `[start, end)` (millis)
pub async fn find_ids_by_driver_between<'e>(
    db: impl SqliteExecutor<'e>,
    driver_id: i64,
    start: i64,
    end: i64,
) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM tipping_request WHERE driver_id = ? AND created_at >= ? AND created_at < ? ORDER BY created_at, id",
    )
    .bind(driver_id)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await?;
    Ok(ids)
}
