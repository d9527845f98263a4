//! Task store operations
//!
//! Validation runs before any write. Payment writes recompute the cash total
//! of whichever sheet lists the task, in the same transaction.

use shared::models::{Task, TaskCreate, TaskFilter, TaskPaymentUpdate};
use sqlx::SqlitePool;

use super::recompute_sheets;
use crate::db::repository::{RepoError, begin_write, daily_sheet, task};
use crate::money;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN,
    validate_amount, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

pub(crate) fn task_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::TaskNotFound, format!("Task {id} not found"))
        .with_detail("task_id", id)
}

fn validate_create(data: &TaskCreate) -> AppResult<()> {
    validate_required_text(&data.client_name, "client_name", MAX_NAME_LEN)?;
    validate_required_text(&data.collection_address, "collection_address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&data.client_phone, "client_phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.client_email, "client_email", MAX_EMAIL_LEN)?;
    validate_optional_text(&data.note, "note", MAX_NOTE_LEN)?;

    if data.items.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::TaskEmpty,
            "A task needs at least one item",
        ));
    }
    for (i, item) in data.items.iter().enumerate() {
        let has_description = item
            .description
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty());
        if item.catalog_item_id.is_none() && !has_description {
            return Err(AppError::with_message(
                ErrorCode::TaskItemInvalid,
                format!("Item {i} needs a catalog item or a description"),
            )
            .with_detail("index", i));
        }
        if item.quantity <= 0 {
            return Err(AppError::with_message(
                ErrorCode::TaskItemInvalid,
                format!("Item {i} quantity must be positive, got {}", item.quantity),
            )
            .with_detail("index", i));
        }
        validate_optional_text(&item.description, "description", MAX_SHORT_TEXT_LEN)?;
        validate_amount(item.unit_price, "unit_price")?;
    }
    Ok(())
}

pub async fn create_task(pool: &SqlitePool, data: TaskCreate) -> AppResult<Task> {
    validate_create(&data)?;
    let total_price = money::task_total(&data.items);

    let mut tx = begin_write(pool).await?;
    let created = task::create(&mut tx, &data, total_price).await?;
    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(
        task_id = created.id,
        order_number = created.order_number,
        total_price,
        "Task created"
    );
    Ok(created)
}

pub async fn get_task(pool: &SqlitePool, id: i64) -> AppResult<Task> {
    let mut conn = pool.acquire().await.map_err(RepoError::from)?;
    task::find_detail(&mut conn, id)
        .await?
        .ok_or_else(|| task_not_found(id))
}

pub async fn list_tasks(pool: &SqlitePool, filter: &TaskFilter) -> AppResult<Vec<Task>> {
    Ok(task::list(pool, filter).await?)
}

/// Store a payment result (gateway webhook or driver cash collection).
pub async fn record_payment(pool: &SqlitePool, id: i64, data: TaskPaymentUpdate) -> AppResult<Task> {
    if let Some(cash) = data.cash_received {
        validate_amount(cash, "cash_received")?;
    }

    let mut tx = begin_write(pool).await?;
    task::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| task_not_found(id))?;
    task::record_payment(
        &mut *tx,
        id,
        data.payment_status,
        data.payment_method,
        data.cash_received,
    )
    .await?;

    let sheets = daily_sheet::sheets_with_job(&mut *tx, id).await?;
    recompute_sheets(&mut tx, &sheets).await?;

    let updated = task::find_detail(&mut tx, id)
        .await?
        .ok_or_else(|| task_not_found(id))?;
    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(
        task_id = id,
        payment_status = ?updated.payment_status,
        payment_method = ?updated.payment_method,
        cash_received = updated.cash_received,
        sheets = sheets.len(),
        "Task payment recorded"
    );
    Ok(updated)
}

/// Keep a file-storage URL as proof of service
pub async fn attach_photo(pool: &SqlitePool, id: i64, url: &str) -> AppResult<Task> {
    validate_required_text(url, "url", MAX_URL_LEN)?;

    let mut conn = pool.acquire().await.map_err(RepoError::from)?;
    task::find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| task_not_found(id))?;
    task::add_photo(&mut *conn, id, url).await?;
    let updated = task::find_detail(&mut conn, id)
        .await?
        .ok_or_else(|| task_not_found(id))?;
    Ok(updated)
}
