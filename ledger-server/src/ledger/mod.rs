//! Daily task ledger
//!
//! Every write that can change what a daily sheet holds lives here and runs
//! in one transaction together with the sheet update:
//!
//! - [`tasks`]: task store (create, payment, photos)
//! - [`registry`]: truck CRUD and the per-date task index
//! - [`reconcile`]: status changes moved into sheet buckets
//! - [`builder`]: bulk regeneration of sheets from the index
//! - [`resolver`]: index references dispatched to their entities
//! - [`tipping`]: driver disposal requests

pub mod builder;
pub mod reconcile;
pub mod registry;
pub mod resolver;
pub mod tasks;
pub mod tipping;

pub use builder::SheetBuilder;
pub use reconcile::change_status;
pub use resolver::resolve_tasks_for_date;

use chrono::NaiveDate;
use shared::models::{DailySheet, ExpenseCreate, ExpenseEntry, FuelLog, FuelLogCreate};
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::repository::{RepoError, RepoResult, begin_write, daily_sheet, employee};
use crate::money;
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_amount, validate_optional_text,
    validate_required_text,
};
use crate::utils::time::date_key;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Re-derive `total_cash` of a sheet from its linked jobs and store it.
pub async fn recompute_total_cash(conn: &mut SqliteConnection, sheet_id: i64) -> RepoResult<f64> {
    let payments = daily_sheet::linked_payments(&mut *conn, sheet_id).await?;
    let total = money::cash_total(payments);
    daily_sheet::set_total_cash(&mut *conn, sheet_id, total).await?;
    Ok(total)
}

/// Recompute several sheets, skipping duplicates
pub(crate) async fn recompute_sheets(conn: &mut SqliteConnection, sheet_ids: &[i64]) -> RepoResult<()> {
    let mut seen = Vec::with_capacity(sheet_ids.len());
    for id in sheet_ids {
        if seen.contains(id) {
            continue;
        }
        seen.push(*id);
        recompute_total_cash(conn, *id).await?;
    }
    Ok(())
}

/// Load a sheet with its relations. A stale `total_cash` is repaired
/// before returning.
pub async fn load_sheet(pool: &SqlitePool, driver_id: i64, date: NaiveDate) -> AppResult<DailySheet> {
    let mut tx = begin_write(pool).await?;
    let mut sheet = daily_sheet::find_detail(&mut tx, driver_id, date)
        .await?
        .ok_or_else(|| sheet_not_found(driver_id, date))?;

    let payments = daily_sheet::linked_payments(&mut *tx, sheet.id).await?;
    let expected = money::cash_total(payments);
    if !money::money_eq(expected, sheet.total_cash) {
        tracing::warn!(
            sheet_id = sheet.id,
            stored = sheet.total_cash,
            expected,
            "Stale total_cash on daily sheet, repairing"
        );
        daily_sheet::set_total_cash(&mut *tx, sheet.id, expected).await?;
        sheet.total_cash = expected;
    }
    tx.commit().await.map_err(RepoError::from)?;
    Ok(sheet)
}

pub(crate) fn sheet_not_found(driver_id: i64, date: NaiveDate) -> AppError {
    AppError::with_message(
        ErrorCode::DailySheetNotFound,
        format!("Daily sheet for driver {driver_id} on {date} not found"),
    )
    .with_detail("driver_id", driver_id)
    .with_detail("date", date_key(date))
}

pub(crate) fn employee_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::EmployeeNotFound, format!("Employee {id} not found"))
        .with_detail("employee_id", id)
}

async fn ensure_sheet(pool: &SqlitePool, driver_id: i64, date: NaiveDate, added_by: i64) -> AppResult<i64> {
    employee::find_by_id(pool, added_by)
        .await?
        .ok_or_else(|| employee_not_found(added_by))?;
    let sheet = daily_sheet::find(pool, driver_id, date)
        .await?
        .ok_or_else(|| sheet_not_found(driver_id, date))?;
    Ok(sheet.id)
}

/// Record a fuel purchase on an existing sheet
pub async fn add_fuel(
    pool: &SqlitePool,
    driver_id: i64,
    date: NaiveDate,
    data: FuelLogCreate,
) -> AppResult<FuelLog> {
    validate_amount(data.liters, "liters")?;
    validate_amount(data.amount, "amount")?;
    validate_optional_text(&data.note, "note", MAX_NOTE_LEN)?;

    let sheet_id = ensure_sheet(pool, driver_id, date, data.added_by).await?;
    let log = daily_sheet::add_fuel(pool, sheet_id, &data).await?;
    tracing::info!(sheet_id, fuel_log_id = log.id, amount = log.amount, "Fuel log added");
    Ok(log)
}

/// Record an expense on an existing sheet
pub async fn add_expense(
    pool: &SqlitePool,
    driver_id: i64,
    date: NaiveDate,
    data: ExpenseCreate,
) -> AppResult<ExpenseEntry> {
    validate_required_text(&data.description, "description", MAX_SHORT_TEXT_LEN)?;
    validate_amount(data.amount, "amount")?;

    let sheet_id = ensure_sheet(pool, driver_id, date, data.added_by).await?;
    let entry = daily_sheet::add_expense(pool, sheet_id, &data).await?;
    tracing::info!(sheet_id, expense_id = entry.id, amount = entry.amount, "Expense added");
    Ok(entry)
}
