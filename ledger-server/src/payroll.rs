//! Payroll settlement
//!
//! Shift records are priced from the employee's rates at close. The running
//! balance of an employee is never stored: it is the sum of the settlement
//! entries after the latest RESET. Paying a shift appends a negative entry,
//! so the balance reads as "earned and not yet paid".

use chrono_tz::Tz;
use rust_decimal::Decimal;
use shared::models::{
    Employee, Payroll, PayrollCorrection, PayrollFilter, PayrollStatus, RunningTotals,
    SettlementKind, ShiftEnd, ShiftStart,
};
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::repository::payroll::PayrollFigures;
use crate::db::repository::{RepoError, begin_write, daily_sheet, employee, payroll};
use crate::ledger::employee_not_found;
use crate::money::{self, PayRates};
use crate::utils::time::{date_key, millis_to_date};
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text, validate_timestamp};
use crate::utils::{AppError, AppResult, ErrorCode};

fn payroll_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::PayrollNotFound, format!("Payroll {id} not found"))
        .with_detail("payroll_id", id)
}

fn already_paid(id: i64) -> AppError {
    AppError::with_message(ErrorCode::PayrollAlreadyPaid, format!("Payroll {id} is already paid"))
        .with_detail("payroll_id", id)
}

fn still_open(id: i64) -> AppError {
    AppError::with_message(ErrorCode::ShiftStillOpen, format!("Payroll {id} is still open"))
        .with_detail("payroll_id", id)
}

fn invalid_range(start: i64, end: i64) -> AppError {
    AppError::with_message(
        ErrorCode::InvalidShiftRange,
        format!("Shift end {end} must be after start {start}"),
    )
    .with_detail("start_time", start)
    .with_detail("end_time", end)
}

fn check_range(start: i64, end: i64) -> AppResult<()> {
    validate_timestamp(start, "start_time")?;
    validate_timestamp(end, "end_time")?;
    if end <= start {
        return Err(invalid_range(start, end));
    }
    Ok(())
}

fn rates_of(emp: &Employee) -> PayRates {
    PayRates {
        hour_rate: emp.hour_rate,
        overtime_rate: emp.overtime_rate,
        regular_hours_limit: emp.regular_hours_limit,
    }
}

async fn find_employee(conn: &mut SqliteConnection, user_id: i64) -> AppResult<Employee> {
    employee::find_by_id(&mut *conn, user_id)
        .await?
        .ok_or_else(|| employee_not_found(user_id))
}

/// Price a shift and pull the cash and expenses of its calendar day.
async fn compute_figures(
    conn: &mut SqliteConnection,
    emp: &Employee,
    start: i64,
    end: i64,
    tz: Tz,
) -> AppResult<PayrollFigures> {
    let pay = money::shift_pay(start, end, rates_of(emp))
        .ok_or_else(|| invalid_range(start, end))?;
    let date = millis_to_date(start, tz);

    let total_cash = match daily_sheet::find(&mut *conn, emp.id, date).await? {
        Some(sheet) => money::cash_total(daily_sheet::linked_payments(&mut *conn, sheet.id).await?),
        None => 0.0,
    };
    let expenses: Decimal = daily_sheet::expense_amounts_by(&mut *conn, emp.id, date)
        .await?
        .into_iter()
        .map(money::to_decimal)
        .sum();

    tracing::debug!(
        user_id = emp.id,
        date = %date_key(date),
        total_hours = pay.total_hours,
        salary = pay.salary,
        total_cash,
        "Shift priced"
    );
    Ok(PayrollFigures {
        total_hours: pay.total_hours,
        regular_hours: pay.regular_hours,
        overtime_hours: pay.overtime_hours,
        salary: pay.salary,
        total_cash,
        total_expenses: money::to_f64(expenses),
    })
}

pub async fn start_shift(pool: &SqlitePool, data: ShiftStart) -> AppResult<Payroll> {
    let mut conn = pool.acquire().await.map_err(RepoError::from)?;
    let emp = find_employee(&mut conn, data.user_id).await?;
    if !emp.is_active {
        return Err(AppError::with_message(
            ErrorCode::EmployeeInactive,
            format!("Employee {} is inactive", emp.id),
        ));
    }

    let start_time = data.start_time.unwrap_or_else(shared::util::now_millis);
    validate_timestamp(start_time, "start_time")?;
    let record = match payroll::insert_open(&mut *conn, emp.id, start_time).await {
        Ok(p) => p,
        Err(RepoError::Duplicate(_)) => {
            return Err(AppError::with_message(
                ErrorCode::ShiftAlreadyOpen,
                format!("Employee {} already has an open shift", emp.id),
            )
            .with_detail("user_id", emp.id));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = emp.id, payroll_id = record.id, start_time, "Shift started");
    Ok(record)
}

/// Close the open shift of a user and accrue its pay.
pub async fn end_shift(pool: &SqlitePool, tz: Tz, data: ShiftEnd) -> AppResult<Payroll> {
    let mut tx = begin_write(pool).await?;
    let emp = find_employee(&mut tx, data.user_id).await?;
    let open = payroll::find_open(&mut *tx, emp.id).await?.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::NoOpenShift,
            format!("Employee {} has no open shift", emp.id),
        )
        .with_detail("user_id", emp.id)
    })?;

    let end_time = data.end_time.unwrap_or_else(shared::util::now_millis);
    check_range(open.start_time, end_time)?;

    let figures = compute_figures(&mut tx, &emp, open.start_time, end_time, tz).await?;
    let closed = payroll::write_figures(&mut *tx, open.id, open.start_time, end_time, &figures, None).await?;
    payroll::append_settlement(
        &mut *tx,
        emp.id,
        Some(closed.id),
        SettlementKind::Earned,
        figures.total_hours,
        figures.salary,
    )
    .await?;
    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(
        user_id = emp.id,
        payroll_id = closed.id,
        total_hours = closed.total_hours,
        overtime_hours = closed.overtime_hours,
        salary = closed.salary,
        "Shift ended"
    );
    Ok(closed)
}

/// Admin correction of a closed, unpaid shift. The difference is appended
/// to the settlement ledger.
pub async fn correct_shift(
    pool: &SqlitePool,
    tz: Tz,
    id: i64,
    data: PayrollCorrection,
) -> AppResult<Payroll> {
    validate_optional_text(&data.note, "note", MAX_NOTE_LEN)?;

    let mut tx = begin_write(pool).await?;
    let current = payroll::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| payroll_not_found(id))?;
    if current.status == PayrollStatus::Paid {
        return Err(already_paid(id));
    }
    let Some(current_end) = current.end_time else {
        return Err(still_open(id));
    };

    let start = data.start_time.unwrap_or(current.start_time);
    let end = data.end_time.unwrap_or(current_end);
    check_range(start, end)?;

    let emp = find_employee(&mut tx, current.user_id).await?;
    let figures = compute_figures(&mut tx, &emp, start, end, tz).await?;
    let corrected = payroll::write_figures(&mut *tx, id, start, end, &figures, data.note.as_deref())
        .await
        .map_err(|e| match e {
            RepoError::Conflict(_) => already_paid(id),
            other => other.into(),
        })?;

    let hours_delta = money::to_decimal(figures.total_hours) - money::to_decimal(current.total_hours);
    let salary_delta = money::to_decimal(figures.salary) - money::to_decimal(current.salary);
    if !hours_delta.is_zero() || !salary_delta.is_zero() {
        payroll::append_settlement(
            &mut *tx,
            current.user_id,
            Some(id),
            SettlementKind::Adjusted,
            money::to_f64(hours_delta),
            money::to_f64(salary_delta),
        )
        .await?;
    }
    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(
        payroll_id = id,
        user_id = current.user_id,
        hours_delta = %hours_delta,
        salary_delta = %salary_delta,
        "Shift corrected"
    );
    Ok(corrected)
}

/// Flip a closed shift to PAID and take its pay off the running balance.
pub async fn mark_paid(pool: &SqlitePool, tz: Tz, id: i64) -> AppResult<Payroll> {
    let mut tx = begin_write(pool).await?;
    let current = payroll::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| payroll_not_found(id))?;
    if current.status == PayrollStatus::Paid {
        return Err(already_paid(id));
    }
    let Some(end) = current.end_time else {
        return Err(still_open(id));
    };

    let emp = find_employee(&mut tx, current.user_id).await?;
    let figures = compute_figures(&mut tx, &emp, current.start_time, end, tz).await?;
    payroll::write_figures(&mut *tx, id, current.start_time, end, &figures, None).await?;
    let paid = payroll::mark_paid(&mut *tx, id).await.map_err(|e| match e {
        RepoError::Conflict(_) => already_paid(id),
        other => other.into(),
    })?;
    payroll::append_settlement(
        &mut *tx,
        current.user_id,
        Some(id),
        SettlementKind::Paid,
        -figures.total_hours,
        -figures.salary,
    )
    .await?;
    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(payroll_id = id, user_id = current.user_id, salary = paid.salary, "Payroll marked paid");
    Ok(paid)
}

pub async fn running_totals(pool: &SqlitePool, user_id: i64) -> AppResult<RunningTotals> {
    let mut conn = pool.acquire().await.map_err(RepoError::from)?;
    find_employee(&mut conn, user_id).await?;
    let entries = payroll::settlements_since_reset(&mut *conn, user_id).await?;
    let since = payroll::last_reset_at(&mut *conn, user_id).await?;

    let hours: Decimal = entries.iter().map(|e| money::to_decimal(e.hours)).sum();
    let salary: Decimal = entries.iter().map(|e| money::to_decimal(e.amount)).sum();
    Ok(RunningTotals {
        user_id,
        total_hours_worked: money::to_f64(hours),
        total_salary: money::to_f64(salary),
        since,
    })
}

/// Start the running balance over from zero. History is kept.
pub async fn reset_running_totals(pool: &SqlitePool, user_id: i64) -> AppResult<RunningTotals> {
    let mut conn = pool.acquire().await.map_err(RepoError::from)?;
    find_employee(&mut conn, user_id).await?;
    payroll::append_settlement(&mut *conn, user_id, None, SettlementKind::Reset, 0.0, 0.0).await?;
    drop(conn);

    tracing::info!(user_id, "Running totals reset");
    running_totals(pool, user_id).await
}

pub async fn list(pool: &SqlitePool, filter: &PayrollFilter) -> AppResult<Vec<Payroll>> {
    Ok(payroll::list(pool, filter).await?)
}

pub async fn get(pool: &SqlitePool, id: i64) -> AppResult<Payroll> {
    payroll::find_by_id(pool, id)
        .await?
        .ok_or_else(|| payroll_not_found(id))
}
