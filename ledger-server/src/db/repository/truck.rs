//! Truck Repository and per-date task index
//!
//! The index is stored one row per reference in `truck_task_ref`.
//! `UNIQUE(kind, task_id)` makes "assigned to at most one truck" a storage
//! constraint: a second insert fails with [`RepoError::Duplicate`].

use super::{RepoError, RepoResult};
use chrono::NaiveDate;
use shared::models::{TaskKind, TaskRef, Truck, TruckCreate, TruckIndex, TruckUpdate};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, name, plate, driver_id, helper_id, is_active, created_at, updated_at";

/// Where an entity sits in the truck indexes
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RefLocation {
    pub truck_id: i64,
    pub service_date: NaiveDate,
    pub sort_order: i32,
}

pub async fn find_by_id<'e>(db: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<Truck>> {
    let sql = format!("SELECT {COLUMNS} FROM truck WHERE id = ?");
    let truck = sqlx::query_as::<_, Truck>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(truck)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Truck>> {
    let sql = format!("SELECT {COLUMNS} FROM truck ORDER BY name");
    let trucks = sqlx::query_as::<_, Truck>(&sql).fetch_all(pool).await?;
    Ok(trucks)
}

pub async fn create(pool: &SqlitePool, data: &TruckCreate) -> RepoResult<Truck> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO truck (id, name, plate, driver_id, helper_id, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.plate)
    .bind(data.driver_id)
    .bind(data.helper_id)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create truck".into()))
}

/// Name/plate/active are partial; crew seats are replaced as given.
pub async fn update(pool: &SqlitePool, id: i64, data: &TruckUpdate) -> RepoResult<Truck> {
    let rows = sqlx::query(
        "UPDATE truck SET name = COALESCE(?1, name), plate = COALESCE(?2, plate), is_active = COALESCE(?3, is_active), driver_id = ?4, helper_id = ?5, updated_at = ?6 WHERE id = ?7",
    )
    .bind(&data.name)
    .bind(&data.plate)
    .bind(data.is_active)
    .bind(data.driver_id)
    .bind(data.helper_id)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Truck {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Truck {id} not found")))
}

/// Drivers currently seated on an active truck
pub async fn driver_ids<'e>(db: impl SqliteExecutor<'e>) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT DISTINCT driver_id FROM truck WHERE driver_id IS NOT NULL AND is_active = 1 ORDER BY driver_id",
    )
    .fetch_all(db)
    .await?;
    Ok(ids)
}

// ── Index ───────────────────────────────────────────────────────────

pub async fn find_ref<'e>(
    db: impl SqliteExecutor<'e>,
    kind: TaskKind,
    task_id: i64,
) -> RepoResult<Option<RefLocation>> {
    let loc = sqlx::query_as::<_, RefLocation>(
        "SELECT truck_id, service_date, sort_order FROM truck_task_ref WHERE kind = ? AND task_id = ?",
    )
    .bind(kind)
    .bind(task_id)
    .fetch_optional(db)
    .await?;
    Ok(loc)
}

/// Append a reference at the end of the truck's list for `date`.
///
/// Fails with `Duplicate` if the entity is in any truck index.
pub async fn insert_ref(
    conn: &mut SqliteConnection,
    truck_id: i64,
    date: NaiveDate,
    kind: TaskKind,
    task_id: i64,
) -> RepoResult<TaskRef> {
    let order = sqlx::query_scalar::<_, i32>(
        "SELECT COUNT(*) FROM truck_task_ref WHERE truck_id = ? AND service_date = ?",
    )
    .bind(truck_id)
    .bind(date)
    .fetch_one(&mut *conn)
    .await?;

    sqlx::query(
        "INSERT INTO truck_task_ref (id, truck_id, service_date, kind, task_id, sort_order) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(shared::util::snowflake_id())
    .bind(truck_id)
    .bind(date)
    .bind(kind)
    .bind(task_id)
    .bind(order)
    .execute(&mut *conn)
    .await?;

    Ok(TaskRef {
        task_id,
        kind,
        order,
    })
}

/// Remove a reference from `(truck_id, date)`; later entries close the gap so
/// orders stay `0..len`. Returns the removed reference.
pub async fn delete_ref(
    conn: &mut SqliteConnection,
    truck_id: i64,
    date: NaiveDate,
    task_id: i64,
) -> RepoResult<Option<TaskRef>> {
    let removed = sqlx::query_as::<_, TaskRef>(
        "DELETE FROM truck_task_ref WHERE truck_id = ? AND service_date = ? AND task_id = ? RETURNING task_id, kind, sort_order",
    )
    .bind(truck_id)
    .bind(date)
    .bind(task_id)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(r) = &removed {
        sqlx::query(
            "UPDATE truck_task_ref SET sort_order = sort_order - 1 WHERE truck_id = ? AND service_date = ? AND sort_order > ?",
        )
        .bind(truck_id)
        .bind(date)
        .bind(r.order)
        .execute(&mut *conn)
        .await?;
    }
    Ok(removed)
}

/// Ordered references of a truck for one date (empty if none)
pub async fn refs_for_date<'e>(
    db: impl SqliteExecutor<'e>,
    truck_id: i64,
    date: NaiveDate,
) -> RepoResult<Vec<TaskRef>> {
    let refs = sqlx::query_as::<_, TaskRef>(
        "SELECT task_id, kind, sort_order FROM truck_task_ref WHERE truck_id = ? AND service_date = ? ORDER BY sort_order",
    )
    .bind(truck_id)
    .bind(date)
    .fetch_all(db)
    .await?;
    Ok(refs)
}

#[derive(sqlx::FromRow)]
struct IndexRow {
    service_date: NaiveDate,
    task_id: i64,
    kind: TaskKind,
    sort_order: i32,
}

/// Full `date -> refs` index of a truck
pub async fn index<'e>(db: impl SqliteExecutor<'e>, truck_id: i64) -> RepoResult<TruckIndex> {
    let rows = sqlx::query_as::<_, IndexRow>(
        "SELECT service_date, task_id, kind, sort_order FROM truck_task_ref WHERE truck_id = ? ORDER BY service_date, sort_order",
    )
    .bind(truck_id)
    .fetch_all(db)
    .await?;

    let mut index = TruckIndex::new();
    for row in rows {
        index.entry(row.service_date).or_default().push(TaskRef {
            task_id: row.task_id,
            kind: row.kind,
            order: row.sort_order,
        });
    }
    Ok(index)
}

/// References for `date` across every truck the driver is seated on
pub async fn refs_for_driver_date<'e>(
    db: impl SqliteExecutor<'e>,
    driver_id: i64,
    date: NaiveDate,
) -> RepoResult<Vec<TaskRef>> {
    let refs = sqlx::query_as::<_, TaskRef>(
        "SELECT r.task_id, r.kind, r.sort_order FROM truck_task_ref r JOIN truck t ON t.id = r.truck_id WHERE t.driver_id = ? AND r.service_date = ? ORDER BY t.id, r.sort_order",
    )
    .bind(driver_id)
    .bind(date)
    .fetch_all(db)
    .await?;
    Ok(refs)
}
