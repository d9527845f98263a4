//! Payroll API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{Payroll, PayrollCorrection, PayrollFilter, ShiftEnd, ShiftStart};

use crate::core::ServerState;
use crate::payroll;
use crate::services::Notification;
use crate::utils::{ApiResult, CreatedResult, created, ok, ok_with_message};

pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<PayrollFilter>,
) -> ApiResult<Vec<Payroll>> {
    Ok(ok(payroll::list(&state.pool, &filter).await?))
}

pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<Payroll> {
    Ok(ok(payroll::get(&state.pool, id).await?))
}

pub async fn start(
    State(state): State<ServerState>,
    Json(payload): Json<ShiftStart>,
) -> CreatedResult<Payroll> {
    Ok(created(payroll::start_shift(&state.pool, payload).await?))
}

/// Close the open shift and send the summary to the admin
pub async fn end(State(state): State<ServerState>, Json(payload): Json<ShiftEnd>) -> ApiResult<Payroll> {
    let record = payroll::end_shift(&state.pool, state.config.timezone, payload).await?;
    state.notifications.notify_admin(Notification::ShiftEnded {
        user_id: record.user_id,
        payroll_id: record.id,
        total_hours: record.total_hours,
        salary: record.salary,
        total_cash: record.total_cash,
    });
    Ok(ok(record))
}

pub async fn correct(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PayrollCorrection>,
) -> ApiResult<Payroll> {
    let record = payroll::correct_shift(&state.pool, state.config.timezone, id, payload).await?;
    Ok(ok_with_message(record, "Payroll corrected"))
}

pub async fn mark_paid(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<Payroll> {
    Ok(ok(payroll::mark_paid(&state.pool, state.config.timezone, id).await?))
}
