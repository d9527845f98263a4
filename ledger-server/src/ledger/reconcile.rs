//! Status reconciliation
//!
//! A status change and the matching move between sheet buckets commit
//! together or not at all.
//!
//! Lifecycle: `NOT_COMPLETED → PROCESSING → {COMPLETED, CANCELLED, ON_HOLD}`
//! and `ON_HOLD ↔ PROCESSING`. Other moves are logged and applied anyway.

use shared::models::{Task, TaskKind, TaskStatus};
use sqlx::{SqliteConnection, SqlitePool};

use super::recompute_sheets;
use super::tasks::task_not_found;
use crate::db::repository::{RepoError, RepoResult, begin_write, daily_sheet, task, truck};
use crate::utils::AppResult;

/// Where a status change landed on the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Task moved into a bucket of this sheet
    Sheet { driver_id: i64, sheet_id: i64 },
    /// Task is not on any truck index
    Unassigned,
    /// Truck has no driver seated
    NoDriver { truck_id: i64 },
}

/// Set the status of a task and move it into the matching bucket of its
/// driver's sheet.
pub async fn change_status(
    pool: &SqlitePool,
    task_id: i64,
    status: TaskStatus,
) -> AppResult<(Task, Placement)> {
    let mut tx = begin_write(pool).await?;

    let current = task::find_by_id(&mut *tx, task_id)
        .await?
        .ok_or_else(|| task_not_found(task_id))?;
    let from = current.task_status;
    if from != status && !from.can_transition_to(status) {
        tracing::warn!(
            task_id,
            from = from.as_str(),
            to = status.as_str(),
            "Status transition outside the task lifecycle, applying anyway"
        );
    }

    task::set_status(&mut *tx, task_id, status).await?;
    let placement = place_on_sheet(&mut tx, task_id, status, current.service_date).await?;

    let updated = task::find_detail(&mut tx, task_id)
        .await?
        .ok_or_else(|| task_not_found(task_id))?;
    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(
        task_id,
        from = from.as_str(),
        to = status.as_str(),
        placement = ?placement,
        "Task status changed"
    );
    Ok((updated, placement))
}

/// Put the task into the bucket for `status` on its driver's sheet.
///
/// The sheet date is the task's service date, falling back to the date the
/// task is indexed under.
pub(crate) async fn place_on_sheet(
    conn: &mut SqliteConnection,
    task_id: i64,
    status: TaskStatus,
    service_date: Option<chrono::NaiveDate>,
) -> RepoResult<Placement> {
    let Some(location) = truck::find_ref(&mut *conn, TaskKind::Task, task_id).await? else {
        tracing::debug!(task_id, "Task not on any truck, sheet untouched");
        return Ok(Placement::Unassigned);
    };
    let Some(driver_id) = truck::find_by_id(&mut *conn, location.truck_id)
        .await?
        .and_then(|t| t.driver_id)
    else {
        tracing::debug!(task_id, truck_id = location.truck_id, "Truck has no driver, sheet untouched");
        return Ok(Placement::NoDriver { truck_id: location.truck_id });
    };

    let date = service_date.unwrap_or(location.service_date);
    let sheet_id = daily_sheet::upsert(&mut *conn, driver_id, date).await?;
    let mut touched = daily_sheet::place_job(conn, sheet_id, task_id, status.bucket()).await?;
    touched.push(sheet_id);
    recompute_sheets(conn, &touched).await?;

    Ok(Placement::Sheet { driver_id, sheet_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::task::tests::sample;
    use crate::db::repository::{employee, test_pool};
    use crate::ledger::{load_sheet, registry, tasks};
    use chrono::NaiveDate;
    use shared::models::{
        EmployeeCreate, EmployeeRole, JobBucket, PaymentMethod, PaymentStatus, TaskAssign,
        TaskPaymentUpdate, TruckCreate,
    };

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()
    }

    /// Driver, truck and one task assigned for `day()`
    async fn setup(pool: &SqlitePool) -> (i64, i64, i64) {
        let driver = employee::create(
            pool,
            EmployeeCreate {
                name: "Dana".into(),
                phone: None,
                email: None,
                role: EmployeeRole::Driver,
                hour_rate: 10.0,
                overtime_rate: 15.0,
                regular_hours_limit: None,
            },
        )
        .await
        .unwrap();
        let truck = registry::create_truck(
            pool,
            TruckCreate {
                name: "T1".into(),
                plate: None,
                driver_id: Some(driver.id),
                helper_id: None,
            },
        )
        .await
        .unwrap();
        let task = tasks::create_task(pool, sample("Ada")).await.unwrap();
        registry::assign(
            pool,
            truck.id,
            TaskAssign { task_id: task.id, kind: TaskKind::Task, date: day() },
        )
        .await
        .unwrap();
        (driver.id, truck.id, task.id)
    }

    #[tokio::test]
    async fn test_processing_then_completed_moves_bucket() {
        let pool = test_pool().await;
        let (driver, _, t1) = setup(&pool).await;

        change_status(&pool, t1, TaskStatus::Processing).await.unwrap();
        let sheet = load_sheet(&pool, driver, day()).await.unwrap();
        assert_eq!(sheet.jobs_pending, vec![t1]);
        assert!(sheet.jobs_done.is_empty());

        let (task, placement) = change_status(&pool, t1, TaskStatus::Completed).await.unwrap();
        assert_eq!(task.task_status, TaskStatus::Completed);
        assert!(matches!(placement, Placement::Sheet { driver_id, .. } if driver_id == driver));

        let sheet = load_sheet(&pool, driver, day()).await.unwrap();
        assert_eq!(sheet.jobs_done, vec![t1]);
        assert!(sheet.jobs_pending.is_empty(), "completed task left in pending");
    }

    #[tokio::test]
    async fn test_every_status_lands_in_one_bucket() {
        let pool = test_pool().await;
        let (driver, _, t1) = setup(&pool).await;

        for status in [
            TaskStatus::Processing,
            TaskStatus::OnHold,
            TaskStatus::Processing,
            TaskStatus::Cancelled,
            TaskStatus::NotCompleted,
        ] {
            change_status(&pool, t1, status).await.unwrap();
            let sheet = load_sheet(&pool, driver, day()).await.unwrap();
            let holding: Vec<JobBucket> = [
                JobBucket::Done,
                JobBucket::Pending,
                JobBucket::Cancelled,
                JobBucket::OnHold,
                JobBucket::NotStarted,
            ]
            .into_iter()
            .filter(|b| sheet.bucket(*b).contains(&t1))
            .collect();
            assert_eq!(holding, vec![status.bucket()]);
        }
    }

    #[tokio::test]
    async fn test_unassigned_task_only_gets_status() {
        let pool = test_pool().await;
        let t = tasks::create_task(&pool, sample("Bob")).await.unwrap();
        let (task, placement) = change_status(&pool, t.id, TaskStatus::Processing).await.unwrap();
        assert_eq!(task.task_status, TaskStatus::Processing);
        assert_eq!(placement, Placement::Unassigned);
    }

    #[tokio::test]
    async fn test_unknown_task_fails_without_writes() {
        let pool = test_pool().await;
        let err = change_status(&pool, 999, TaskStatus::Completed).await.unwrap_err();
        assert_eq!(err.code, crate::utils::ErrorCode::TaskNotFound);
    }

    #[tokio::test]
    async fn test_cash_total_follows_cash_jobs() {
        let pool = test_pool().await;
        let (driver, _, t1) = setup(&pool).await;

        tasks::record_payment(
            &pool,
            t1,
            TaskPaymentUpdate {
                payment_status: PaymentStatus::Paid,
                payment_method: Some(PaymentMethod::Cash),
                cash_received: Some(45.5),
            },
        )
        .await
        .unwrap();
        change_status(&pool, t1, TaskStatus::Completed).await.unwrap();
        let sheet = load_sheet(&pool, driver, day()).await.unwrap();
        assert_eq!(sheet.total_cash, 45.5);

        tasks::record_payment(
            &pool,
            t1,
            TaskPaymentUpdate {
                payment_status: PaymentStatus::Paid,
                payment_method: Some(PaymentMethod::Card),
                cash_received: None,
            },
        )
        .await
        .unwrap();
        let sheet = load_sheet(&pool, driver, day()).await.unwrap();
        assert_eq!(sheet.total_cash, 0.0);
    }

    #[tokio::test]
    async fn test_load_sheet_repairs_stale_cash() {
        let pool = test_pool().await;
        let (driver, _, _) = setup(&pool).await;
        let sheet = load_sheet(&pool, driver, day()).await.unwrap();
        daily_sheet::set_total_cash(&pool, sheet.id, 999.0).await.unwrap();

        let repaired = load_sheet(&pool, driver, day()).await.unwrap();
        assert_eq!(repaired.total_cash, 0.0);
    }
}
