//! Daily Sheet Repository
//!
//! Bucket membership lives in `daily_sheet_job`, keyed by
//! `(sheet_id, task_id)`. Moving a job between buckets is one upsert on that
//! key; moving it between sheets also deletes the old sheet's row.

use super::RepoResult;
use chrono::NaiveDate;
use shared::models::{
    DailySheet, ExpenseCreate, ExpenseEntry, FuelLog, FuelLogCreate, JobBucket, PaymentMethod,
};
use sqlx::{SqliteConnection, SqliteExecutor};

const COLUMNS: &str = "id, driver_id, sheet_date, total_cash, created_at, updated_at";

pub async fn find<'e>(
    db: impl SqliteExecutor<'e>,
    driver_id: i64,
    date: NaiveDate,
) -> RepoResult<Option<DailySheet>> {
    let sql = format!("SELECT {COLUMNS} FROM daily_sheet WHERE driver_id = ? AND sheet_date = ?");
    let sheet = sqlx::query_as::<_, DailySheet>(&sql)
        .bind(driver_id)
        .bind(date)
        .fetch_optional(db)
        .await?;
    Ok(sheet)
}

pub async fn find_by_id<'e>(db: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<DailySheet>> {
    let sql = format!("SELECT {COLUMNS} FROM daily_sheet WHERE id = ?");
    let sheet = sqlx::query_as::<_, DailySheet>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(sheet)
}

/// Sheet with buckets, tipping list, fuel logs and expenses
pub async fn find_detail(
    conn: &mut SqliteConnection,
    driver_id: i64,
    date: NaiveDate,
) -> RepoResult<Option<DailySheet>> {
    let Some(mut sheet) = find(&mut *conn, driver_id, date).await? else {
        return Ok(None);
    };
    load_relations(conn, &mut sheet).await?;
    Ok(Some(sheet))
}

#[derive(sqlx::FromRow)]
struct JobRow {
    task_id: i64,
    bucket: JobBucket,
}

pub async fn load_relations(conn: &mut SqliteConnection, sheet: &mut DailySheet) -> RepoResult<()> {
    let jobs = sqlx::query_as::<_, JobRow>(
        "SELECT task_id, bucket FROM daily_sheet_job WHERE sheet_id = ? ORDER BY position, task_id",
    )
    .bind(sheet.id)
    .fetch_all(&mut *conn)
    .await?;
    for job in jobs {
        sheet.bucket_mut(job.bucket).push(job.task_id);
    }

    sheet.tipping_requests = sqlx::query_scalar::<_, i64>(
        "SELECT tipping_request_id FROM daily_sheet_tipping WHERE sheet_id = ? ORDER BY position",
    )
    .bind(sheet.id)
    .fetch_all(&mut *conn)
    .await?;

    sheet.fuel_logs = sqlx::query_as::<_, FuelLog>(
        "SELECT id, sheet_id, added_by, liters, amount, note, created_at FROM daily_sheet_fuel WHERE sheet_id = ? ORDER BY created_at, id",
    )
    .bind(sheet.id)
    .fetch_all(&mut *conn)
    .await?;

    sheet.expenses = sqlx::query_as::<_, ExpenseEntry>(
        "SELECT id, sheet_id, added_by, description, amount, created_at FROM daily_sheet_expense WHERE sheet_id = ? ORDER BY created_at, id",
    )
    .bind(sheet.id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(())
}

/// Resolve-or-create the sheet `(driver_id, date)`, returning its id
pub async fn upsert<'e>(db: impl SqliteExecutor<'e>, driver_id: i64, date: NaiveDate) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO daily_sheet (id, driver_id, sheet_date, total_cash, created_at, updated_at) VALUES (?1, ?2, ?3, 0, ?4, ?4) ON CONFLICT (driver_id, sheet_date) DO UPDATE SET updated_at = excluded.updated_at RETURNING id",
    )
    .bind(shared::util::snowflake_id())
    .bind(driver_id)
    .bind(date)
    .bind(now)
    .fetch_one(db)
    .await?;
    Ok(id)
}

/// Sheets currently listing `task_id`
pub async fn sheets_with_job<'e>(db: impl SqliteExecutor<'e>, task_id: i64) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>("SELECT sheet_id FROM daily_sheet_job WHERE task_id = ?")
        .bind(task_id)
        .fetch_all(db)
        .await?;
    Ok(ids)
}

/// Put `task_id` in `bucket` of `sheet_id`, and nowhere else.
///
/// Staying in the same bucket keeps its position; a new bucket appends.
/// Returns the other sheets the job was removed from.
pub async fn place_job(
    conn: &mut SqliteConnection,
    sheet_id: i64,
    task_id: i64,
    bucket: JobBucket,
) -> RepoResult<Vec<i64>> {
    let moved_from = sqlx::query_scalar::<_, i64>(
        "DELETE FROM daily_sheet_job WHERE task_id = ? AND sheet_id <> ? RETURNING sheet_id",
    )
    .bind(task_id)
    .bind(sheet_id)
    .fetch_all(&mut *conn)
    .await?;

    sqlx::query(
        "INSERT INTO daily_sheet_job (sheet_id, task_id, bucket, position) VALUES (?1, ?2, ?3, (SELECT COALESCE(MAX(position), -1) + 1 FROM daily_sheet_job WHERE sheet_id = ?1 AND bucket = ?3)) ON CONFLICT (sheet_id, task_id) DO UPDATE SET position = CASE WHEN daily_sheet_job.bucket = excluded.bucket THEN daily_sheet_job.position ELSE excluded.position END, bucket = excluded.bucket",
    )
    .bind(sheet_id)
    .bind(task_id)
    .bind(bucket)
    .execute(&mut *conn)
    .await?;

    Ok(moved_from)
}

/// Drop `task_id` from every bucket of every sheet. Idempotent.
/// Returns the sheets it was removed from.
pub async fn remove_job<'e>(db: impl SqliteExecutor<'e>, task_id: i64) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>("DELETE FROM daily_sheet_job WHERE task_id = ? RETURNING sheet_id")
        .bind(task_id)
        .fetch_all(db)
        .await?;
    Ok(ids)
}

/// Replace the whole job membership of a sheet. Jobs listed here are
/// detached from any other sheet first; returns those other sheets.
pub async fn replace_jobs(
    conn: &mut SqliteConnection,
    sheet_id: i64,
    jobs: &[(i64, JobBucket)],
) -> RepoResult<Vec<i64>> {
    sqlx::query("DELETE FROM daily_sheet_job WHERE sheet_id = ?")
        .bind(sheet_id)
        .execute(&mut *conn)
        .await?;

    let mut moved_from = Vec::new();
    for (task_id, bucket) in jobs {
        for other in place_job(conn, sheet_id, *task_id, *bucket).await? {
            if !moved_from.contains(&other) {
                moved_from.push(other);
            }
        }
    }
    Ok(moved_from)
}

pub async fn add_tipping<'e>(db: impl SqliteExecutor<'e>, sheet_id: i64, request_id: i64) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO daily_sheet_tipping (sheet_id, tipping_request_id, position) VALUES (?1, ?2, (SELECT COALESCE(MAX(position), -1) + 1 FROM daily_sheet_tipping WHERE sheet_id = ?1)) ON CONFLICT (sheet_id, tipping_request_id) DO NOTHING",
    )
    .bind(sheet_id)
    .bind(request_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn remove_tipping<'e>(db: impl SqliteExecutor<'e>, request_id: i64) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "DELETE FROM daily_sheet_tipping WHERE tipping_request_id = ? RETURNING sheet_id",
    )
    .bind(request_id)
    .fetch_all(db)
    .await?;
    Ok(ids)
}

pub async fn replace_tipping(conn: &mut SqliteConnection, sheet_id: i64, request_ids: &[i64]) -> RepoResult<()> {
    sqlx::query("DELETE FROM daily_sheet_tipping WHERE sheet_id = ?")
        .bind(sheet_id)
        .execute(&mut *conn)
        .await?;
    for id in request_ids {
        add_tipping(&mut *conn, sheet_id, *id).await?;
    }
    Ok(())
}

/// `(payment_method, cash_received)` of every job linked to the sheet
pub async fn linked_payments<'e>(
    db: impl SqliteExecutor<'e>,
    sheet_id: i64,
) -> RepoResult<Vec<(Option<PaymentMethod>, f64)>> {
    let rows = sqlx::query_as::<_, (Option<PaymentMethod>, f64)>(
        "SELECT t.payment_method, t.cash_received FROM daily_sheet_job j JOIN task t ON t.id = j.task_id WHERE j.sheet_id = ?",
    )
    .bind(sheet_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn set_total_cash<'e>(db: impl SqliteExecutor<'e>, sheet_id: i64, total: f64) -> RepoResult<()> {
    sqlx::query("UPDATE daily_sheet SET total_cash = ?, updated_at = ? WHERE id = ?")
        .bind(total)
        .bind(shared::util::now_millis())
        .bind(sheet_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn add_fuel<'e>(db: impl SqliteExecutor<'e>, sheet_id: i64, data: &FuelLogCreate) -> RepoResult<FuelLog> {
    let log = sqlx::query_as::<_, FuelLog>(
        "INSERT INTO daily_sheet_fuel (id, sheet_id, added_by, liters, amount, note, created_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id, sheet_id, added_by, liters, amount, note, created_at",
    )
    .bind(shared::util::snowflake_id())
    .bind(sheet_id)
    .bind(data.added_by)
    .bind(data.liters)
    .bind(data.amount)
    .bind(&data.note)
    .bind(shared::util::now_millis())
    .fetch_one(db)
    .await?;
    Ok(log)
}

pub async fn add_expense<'e>(
    db: impl SqliteExecutor<'e>,
    sheet_id: i64,
    data: &ExpenseCreate,
) -> RepoResult<ExpenseEntry> {
    let entry = sqlx::query_as::<_, ExpenseEntry>(
        "INSERT INTO daily_sheet_expense (id, sheet_id, added_by, description, amount, created_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING id, sheet_id, added_by, description, amount, created_at",
    )
    .bind(shared::util::snowflake_id())
    .bind(sheet_id)
    .bind(data.added_by)
    .bind(&data.description)
    .bind(data.amount)
    .bind(shared::util::now_millis())
    .fetch_one(db)
    .await?;
    Ok(entry)
}

/// Expense amounts an employee logged on any sheet of `date`
pub async fn expense_amounts_by<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: i64,
    date: NaiveDate,
) -> RepoResult<Vec<f64>> {
    let amounts = sqlx::query_scalar::<_, f64>(
        "SELECT e.amount FROM daily_sheet_expense e JOIN daily_sheet s ON s.id = e.sheet_id WHERE e.added_by = ? AND s.sheet_date = ?",
    )
    .bind(user_id)
    .bind(date)
    .fetch_all(db)
    .await?;
    Ok(amounts)
}
