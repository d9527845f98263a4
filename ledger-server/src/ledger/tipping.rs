//! Tipping requests (driver-initiated disposal runs)

use shared::models::{TippingRequest, TippingRequestCreate};
use sqlx::SqlitePool;

use super::employee_not_found;
use super::registry::truck_not_found;
use crate::db::repository::{employee, tipping, truck};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_amount, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

pub async fn create_request(pool: &SqlitePool, data: TippingRequestCreate) -> AppResult<TippingRequest> {
    validate_required_text(&data.site_name, "site_name", MAX_NAME_LEN)?;
    validate_optional_text(&data.note, "note", MAX_NOTE_LEN)?;
    validate_amount(data.weight_kg, "weight_kg")?;
    validate_amount(data.cost, "cost")?;

    employee::find_by_id(pool, data.driver_id)
        .await?
        .ok_or_else(|| employee_not_found(data.driver_id))?;
    if let Some(truck_id) = data.truck_id {
        truck::find_by_id(pool, truck_id)
            .await?
            .ok_or_else(|| truck_not_found(truck_id))?;
    }

    let request = tipping::create(pool, &data).await?;
    tracing::info!(
        tipping_request_id = request.id,
        driver_id = request.driver_id,
        site = %request.site_name,
        "Tipping request created"
    );
    Ok(request)
}

pub(crate) fn tipping_not_found(id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::TippingRequestNotFound,
        format!("Tipping request {id} not found"),
    )
    .with_detail("tipping_request_id", id)
}

pub async fn get_request(pool: &SqlitePool, id: i64) -> AppResult<TippingRequest> {
    tipping::find_by_id(pool, id)
        .await?
        .ok_or_else(|| tipping_not_found(id))
}
