//! Truck API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{
    ResolvedTaskRef, TaskAssign, TaskRef, TaskUnassign, Truck, TruckCreate, TruckIndex, TruckUpdate,
};

use crate::core::ServerState;
use crate::ledger::{registry, resolve_tasks_for_date};
use crate::utils::time::parse_date;
use crate::utils::{ApiResult, CreatedResult, created, ok};

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    #[serde(default)]
    pub resolve: bool,
}

/// Refs for a date, bare or dispatched to their entities
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DateTasks {
    Refs(Vec<TaskRef>),
    Resolved(Vec<ResolvedTaskRef>),
}

pub async fn list(State(state): State<ServerState>) -> ApiResult<Vec<Truck>> {
    Ok(ok(registry::list_trucks(&state.pool).await?))
}

pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<Truck> {
    Ok(ok(registry::get_truck(&state.pool, id).await?))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TruckCreate>,
) -> CreatedResult<Truck> {
    Ok(created(registry::create_truck(&state.pool, payload).await?))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TruckUpdate>,
) -> ApiResult<Truck> {
    Ok(ok(registry::update_truck(&state.pool, id, payload).await?))
}

pub async fn index(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<TruckIndex> {
    Ok(ok(registry::index(&state.pool, id).await?))
}

pub async fn tasks_for_date(
    State(state): State<ServerState>,
    Path((id, date)): Path<(i64, String)>,
    Query(query): Query<DateQuery>,
) -> ApiResult<DateTasks> {
    let date = parse_date(&date)?;
    let tasks = if query.resolve {
        DateTasks::Resolved(resolve_tasks_for_date(&state.pool, id, date).await?)
    } else {
        DateTasks::Refs(registry::tasks_for_date(&state.pool, id, date).await?)
    };
    Ok(ok(tasks))
}

pub async fn assign(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TaskAssign>,
) -> CreatedResult<TaskRef> {
    Ok(created(registry::assign(&state.pool, id, payload).await?))
}

pub async fn unassign(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TaskUnassign>,
) -> ApiResult<TaskRef> {
    Ok(ok(registry::unassign(&state.pool, id, payload).await?))
}
