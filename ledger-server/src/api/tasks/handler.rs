//! Task API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{
    Task, TaskCreate, TaskFilter, TaskPaymentUpdate, TaskPhotoAttach, TaskStatusChange,
};

use crate::core::ServerState;
use crate::ledger::{self, tasks};
use crate::utils::{ApiResult, CreatedResult, created, ok};

pub async fn list(State(state): State<ServerState>, Query(filter): Query<TaskFilter>) -> ApiResult<Vec<Task>> {
    let found = tasks::list_tasks(&state.pool, &filter).await?;
    Ok(ok(found))
}

pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<Task> {
    Ok(ok(tasks::get_task(&state.pool, id).await?))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TaskCreate>,
) -> CreatedResult<Task> {
    let task = tasks::create_task(&state.pool, payload).await?;
    Ok(created(task))
}

pub async fn change_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TaskStatusChange>,
) -> ApiResult<Task> {
    let (task, _) = ledger::change_status(&state.pool, id, payload.status).await?;
    Ok(ok(task))
}

pub async fn record_payment(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TaskPaymentUpdate>,
) -> ApiResult<Task> {
    Ok(ok(tasks::record_payment(&state.pool, id, payload).await?))
}

pub async fn attach_photo(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TaskPhotoAttach>,
) -> ApiResult<Task> {
    Ok(ok(tasks::attach_photo(&state.pool, id, &payload.url).await?))
}
