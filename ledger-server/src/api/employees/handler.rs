//! Employee API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{Employee, EmployeeCreate, EmployeeUpdate, RunningTotals};

use crate::core::ServerState;
use crate::db::repository::employee;
use crate::ledger::employee_not_found;
use crate::payroll;
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_amount, validate_optional_text,
    validate_required_text,
};
use crate::utils::{ApiResult, AppResult, CreatedResult, created, ok, ok_with_message};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

fn validate_rates(hour_rate: Option<f64>, overtime_rate: Option<f64>, limit: Option<f64>) -> AppResult<()> {
    if let Some(v) = hour_rate {
        validate_amount(v, "hour_rate")?;
    }
    if let Some(v) = overtime_rate {
        validate_amount(v, "overtime_rate")?;
    }
    if let Some(v) = limit {
        validate_amount(v, "regular_hours_limit")?;
    }
    Ok(())
}

/// List employees (active only unless `include_inactive=true`)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Employee>> {
    let employees = employee::find_all(&state.pool, query.include_inactive).await?;
    Ok(ok(employees))
}

pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<Employee> {
    let found = employee::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| employee_not_found(id))?;
    Ok(ok(found))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<EmployeeCreate>,
) -> CreatedResult<Employee> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.email, "email", MAX_EMAIL_LEN)?;
    validate_rates(
        Some(payload.hour_rate),
        Some(payload.overtime_rate),
        payload.regular_hours_limit,
    )?;

    let emp = employee::create(&state.pool, payload).await?;
    tracing::info!(employee_id = emp.id, role = ?emp.role, "Employee created");
    Ok(created(emp))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<EmployeeUpdate>,
) -> ApiResult<Employee> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.email, "email", MAX_EMAIL_LEN)?;
    validate_rates(payload.hour_rate, payload.overtime_rate, payload.regular_hours_limit)?;

    employee::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| employee_not_found(id))?;
    let emp = employee::update(&state.pool, id, payload).await?;
    tracing::info!(employee_id = id, "Employee updated");
    Ok(ok(emp))
}

pub async fn running_totals(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> ApiResult<RunningTotals> {
    let totals = payroll::running_totals(&state.pool, id).await?;
    Ok(ok(totals))
}

pub async fn reset_running_totals(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> ApiResult<RunningTotals> {
    let totals = payroll::reset_running_totals(&state.pool, id).await?;
    Ok(ok_with_message(totals, "Running totals reset"))
}
