//! Daily Sheet API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shared::models::{
    DailySheet, ExpenseCreate, ExpenseEntry, FuelLog, FuelLogCreate, SheetGenerate, SheetGenerationSummary,
};

use crate::core::ServerState;
use crate::ledger;
use crate::utils::time::{parse_date, today};
use crate::utils::{ApiResult, CreatedResult, created, ok};

/// A single regenerated sheet or the bulk summary
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GenerateOutcome {
    Sheet(Box<DailySheet>),
    Summary(SheetGenerationSummary),
}

pub async fn get_sheet(
    State(state): State<ServerState>,
    Path((driver_id, date)): Path<(i64, String)>,
) -> ApiResult<DailySheet> {
    let date = parse_date(&date)?;
    Ok(ok(ledger::load_sheet(&state.pool, driver_id, date).await?))
}

pub async fn generate(
    State(state): State<ServerState>,
    Json(payload): Json<SheetGenerate>,
) -> ApiResult<GenerateOutcome> {
    let date = payload.date.unwrap_or_else(|| today(state.config.timezone));
    let outcome = match payload.driver_id {
        Some(driver_id) => {
            let sheet = state.sheets.generate_for_driver(driver_id, date).await?;
            GenerateOutcome::Sheet(Box::new(sheet))
        }
        None => GenerateOutcome::Summary(state.sheets.generate_all(date).await?),
    };
    Ok(ok(outcome))
}

pub async fn add_fuel(
    State(state): State<ServerState>,
    Path((driver_id, date)): Path<(i64, String)>,
    Json(payload): Json<FuelLogCreate>,
) -> CreatedResult<FuelLog> {
    let date = parse_date(&date)?;
    Ok(created(ledger::add_fuel(&state.pool, driver_id, date, payload).await?))
}

pub async fn add_expense(
    State(state): State<ServerState>,
    Path((driver_id, date)): Path<(i64, String)>,
    Json(payload): Json<ExpenseCreate>,
) -> CreatedResult<ExpenseEntry> {
    let date = parse_date(&date)?;
    Ok(created(ledger::add_expense(&state.pool, driver_id, date, payload).await?))
}
