//! Tipping Request API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{TippingRequest, TippingRequestCreate};

use crate::core::ServerState;
use crate::ledger::tipping;
use crate::utils::{ApiResult, CreatedResult, created, ok};

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TippingRequestCreate>,
) -> CreatedResult<TippingRequest> {
    Ok(created(tipping::create_request(&state.pool, payload).await?))
}

pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<TippingRequest> {
    Ok(ok(tipping::get_request(&state.pool, id).await?))
}
