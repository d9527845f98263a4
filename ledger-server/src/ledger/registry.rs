//! Truck registry and per-date task index
//!
//! Assigning writes the index reference, the task's service date and the
//! driver's sheet in one transaction. The `UNIQUE(kind, task_id)` constraint
//! on the index decides races between two trucks.

use chrono::NaiveDate;
use shared::models::{
    EmployeeRole, TaskAssign, TaskKind, TaskRef, TaskUnassign, Truck, TruckCreate, TruckIndex,
    TruckUpdate,
};
use sqlx::{SqliteConnection, SqlitePool};

use super::reconcile::place_on_sheet;
use super::tasks::task_not_found;
use super::tipping::tipping_not_found;
use super::{employee_not_found, recompute_sheets};
use crate::db::repository::{RepoError, begin_write, daily_sheet, employee, task, tipping, truck};
use crate::utils::time::date_key;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

pub(crate) fn truck_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::TruckNotFound, format!("Truck {id} not found"))
        .with_detail("truck_id", id)
}

/// A crew seat must hold an active employee of an allowed role.
async fn check_crew_member(
    pool: &SqlitePool,
    id: i64,
    seat: &str,
    allowed: &[EmployeeRole],
) -> AppResult<()> {
    let emp = employee::find_by_id(pool, id)
        .await?
        .ok_or_else(|| employee_not_found(id))?;
    if !allowed.contains(&emp.role) {
        return Err(AppError::with_message(
            ErrorCode::EmployeeRoleMismatch,
            format!("Employee {id} cannot be seated as {seat}"),
        )
        .with_detail("employee_id", id)
        .with_detail("seat", seat));
    }
    if !emp.is_active {
        return Err(AppError::with_message(
            ErrorCode::EmployeeInactive,
            format!("Employee {id} is inactive"),
        )
        .with_detail("employee_id", id));
    }
    Ok(())
}

async fn check_crew(pool: &SqlitePool, driver_id: Option<i64>, helper_id: Option<i64>) -> AppResult<()> {
    if let Some(id) = driver_id {
        check_crew_member(pool, id, "driver", &[EmployeeRole::Driver]).await?;
    }
    if let Some(id) = helper_id {
        check_crew_member(pool, id, "helper", &[EmployeeRole::Helper, EmployeeRole::Driver]).await?;
    }
    Ok(())
}

pub async fn create_truck(pool: &SqlitePool, data: TruckCreate) -> AppResult<Truck> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&data.plate, "plate", MAX_SHORT_TEXT_LEN)?;
    check_crew(pool, data.driver_id, data.helper_id).await?;

    let created = truck::create(pool, &data).await?;
    tracing::info!(truck_id = created.id, name = %created.name, "Truck created");
    Ok(created)
}

pub async fn update_truck(pool: &SqlitePool, id: i64, data: TruckUpdate) -> AppResult<Truck> {
    if let Some(name) = &data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&data.plate, "plate", MAX_SHORT_TEXT_LEN)?;
    truck::find_by_id(pool, id)
        .await?
        .ok_or_else(|| truck_not_found(id))?;
    check_crew(pool, data.driver_id, data.helper_id).await?;

    let updated = truck::update(pool, id, &data).await?;
    tracing::info!(
        truck_id = id,
        driver_id = ?updated.driver_id,
        helper_id = ?updated.helper_id,
        "Truck updated"
    );
    Ok(updated)
}

pub async fn get_truck(pool: &SqlitePool, id: i64) -> AppResult<Truck> {
    truck::find_by_id(pool, id)
        .await?
        .ok_or_else(|| truck_not_found(id))
}

pub async fn list_trucks(pool: &SqlitePool) -> AppResult<Vec<Truck>> {
    Ok(truck::find_all(pool).await?)
}

/// Ordered references of a truck for one date (empty if none)
pub async fn tasks_for_date(pool: &SqlitePool, truck_id: i64, date: NaiveDate) -> AppResult<Vec<TaskRef>> {
    get_truck(pool, truck_id).await?;
    Ok(truck::refs_for_date(pool, truck_id, date).await?)
}

pub async fn index(pool: &SqlitePool, truck_id: i64) -> AppResult<TruckIndex> {
    get_truck(pool, truck_id).await?;
    Ok(truck::index(pool, truck_id).await?)
}

/// Append a task or tipping request to a truck's list for a date.
pub async fn assign(pool: &SqlitePool, truck_id: i64, data: TaskAssign) -> AppResult<TaskRef> {
    let TaskAssign { task_id, kind, date } = data;
    let mut tx = begin_write(pool).await?;

    let owner = truck::find_by_id(&mut *tx, truck_id)
        .await?
        .ok_or_else(|| truck_not_found(truck_id))?;

    let status = match kind {
        TaskKind::Task => Some(
            task::find_by_id(&mut *tx, task_id)
                .await?
                .ok_or_else(|| task_not_found(task_id))?
                .task_status,
        ),
        TaskKind::TippingRequest => {
            tipping::find_by_id(&mut *tx, task_id)
                .await?
                .ok_or_else(|| tipping_not_found(task_id))?;
            None
        }
    };

    let reference = match truck::insert_ref(&mut tx, truck_id, date, kind, task_id).await {
        Ok(r) => r,
        Err(RepoError::Duplicate(_)) => {
            return Err(already_assigned(&mut tx, kind, task_id).await);
        }
        Err(e) => return Err(e.into()),
    };

    match status {
        Some(status) => {
            task::set_service_date(&mut *tx, task_id, date).await?;
            place_on_sheet(&mut tx, task_id, status, Some(date)).await?;
        }
        None => {
            if let Some(driver_id) = owner.driver_id {
                let sheet_id = daily_sheet::upsert(&mut *tx, driver_id, date).await?;
                daily_sheet::add_tipping(&mut *tx, sheet_id, task_id).await?;
            }
        }
    }
    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(
        truck_id,
        task_id,
        kind = ?kind,
        date = %date_key(date),
        order = reference.order,
        "Assigned to truck"
    );
    Ok(reference)
}

async fn already_assigned(conn: &mut SqliteConnection, kind: TaskKind, task_id: i64) -> AppError {
    let mut err = AppError::with_message(
        ErrorCode::TaskAlreadyAssigned,
        format!("{kind:?} {task_id} is already assigned to a truck"),
    )
    .with_detail("task_id", task_id);
    if let Ok(Some(holder)) = truck::find_ref(&mut *conn, kind, task_id).await {
        err = err
            .with_detail("truck_id", holder.truck_id)
            .with_detail("date", date_key(holder.service_date));
    }
    tracing::warn!(task_id, kind = ?kind, "Assignment rejected, already on a truck");
    err
}

/// Remove a reference from a truck's list and retract it from any sheet.
pub async fn unassign(pool: &SqlitePool, truck_id: i64, data: TaskUnassign) -> AppResult<TaskRef> {
    let TaskUnassign { task_id, date } = data;
    let mut tx = begin_write(pool).await?;

    truck::find_by_id(&mut *tx, truck_id)
        .await?
        .ok_or_else(|| truck_not_found(truck_id))?;

    let removed = truck::delete_ref(&mut tx, truck_id, date, task_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::TaskRefNotFound,
                format!("{task_id} is not on truck {truck_id} for {}", date_key(date)),
            )
            .with_detail("truck_id", truck_id)
            .with_detail("task_id", task_id)
        })?;

    match removed.kind {
        TaskKind::Task => {
            let sheets = daily_sheet::remove_job(&mut *tx, task_id).await?;
            recompute_sheets(&mut tx, &sheets).await?;
        }
        TaskKind::TippingRequest => {
            daily_sheet::remove_tipping(&mut *tx, task_id).await?;
        }
    }
    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(truck_id, task_id, date = %date_key(date), "Unassigned from truck");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::task::tests::sample;
    use crate::db::repository::test_pool;
    use crate::ledger::{load_sheet, tasks};
    use shared::models::{EmployeeCreate, EmployeeUpdate, TaskStatus, TippingRequestCreate};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()
    }

    async fn staff(pool: &SqlitePool, name: &str, role: EmployeeRole) -> i64 {
        employee::create(
            pool,
            EmployeeCreate {
                name: name.into(),
                phone: None,
                email: None,
                role,
                hour_rate: 10.0,
                overtime_rate: 15.0,
                regular_hours_limit: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn crewed_truck(pool: &SqlitePool, name: &str) -> (i64, i64) {
        let driver = staff(pool, &format!("{name}-driver"), EmployeeRole::Driver).await;
        let t = create_truck(
            pool,
            TruckCreate { name: name.into(), plate: None, driver_id: Some(driver), helper_id: None },
        )
        .await
        .unwrap();
        (t.id, driver)
    }

    #[tokio::test]
    async fn test_crew_roles_are_checked() {
        let pool = test_pool().await;
        let helper = staff(&pool, "Hal", EmployeeRole::Helper).await;
        let driver = staff(&pool, "Dana", EmployeeRole::Driver).await;

        let err = create_truck(
            &pool,
            TruckCreate { name: "T".into(), plate: None, driver_id: Some(helper), helper_id: None },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmployeeRoleMismatch);

        employee::update(&pool, driver, EmployeeUpdate { is_active: Some(false), ..Default::default() })
            .await
            .unwrap();
        let err = create_truck(
            &pool,
            TruckCreate { name: "T".into(), plate: None, driver_id: Some(driver), helper_id: None },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmployeeInactive);

        let t = create_truck(
            &pool,
            TruckCreate { name: "T".into(), plate: None, driver_id: None, helper_id: Some(helper) },
        )
        .await
        .unwrap();
        let cleared = update_truck(
            &pool,
            t.id,
            TruckUpdate { name: None, plate: None, is_active: None, driver_id: None, helper_id: None },
        )
        .await
        .unwrap();
        assert_eq!(cleared.helper_id, None);
        assert_eq!(cleared.name, "T");
    }

    #[tokio::test]
    async fn test_second_assignment_conflicts() {
        let pool = test_pool().await;
        let (a, _) = crewed_truck(&pool, "A").await;
        let (b, _) = crewed_truck(&pool, "B").await;
        let t = tasks::create_task(&pool, sample("Ada")).await.unwrap();

        assign(&pool, a, TaskAssign { task_id: t.id, kind: TaskKind::Task, date: day() })
            .await
            .unwrap();
        let err = assign(&pool, b, TaskAssign { task_id: t.id, kind: TaskKind::Task, date: day() })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TaskAlreadyAssigned);
        assert_eq!(err.http_status(), http::StatusCode::CONFLICT);

        assert_eq!(tasks_for_date(&pool, a, day()).await.unwrap().len(), 1);
        assert!(tasks_for_date(&pool, b, day()).await.unwrap().is_empty());
        assert_eq!(tasks::get_task(&pool, t.id).await.unwrap().truck_id, Some(a));
    }

    #[tokio::test]
    async fn test_assign_missing_entities() {
        let pool = test_pool().await;
        let (a, _) = crewed_truck(&pool, "A").await;
        let err = assign(&pool, a, TaskAssign { task_id: 5, kind: TaskKind::Task, date: day() })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TaskNotFound);

        let err = assign(&pool, a, TaskAssign { task_id: 5, kind: TaskKind::TippingRequest, date: day() })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TippingRequestNotFound);

        let err = assign(&pool, 77, TaskAssign { task_id: 5, kind: TaskKind::Task, date: day() })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TruckNotFound);
    }

    #[tokio::test]
    async fn test_assign_places_job_and_sets_service_date() {
        let pool = test_pool().await;
        let (a, driver) = crewed_truck(&pool, "A").await;
        let mut data = sample("Ada");
        data.start_processing = true;
        let t = tasks::create_task(&pool, data).await.unwrap();

        let r = assign(&pool, a, TaskAssign { task_id: t.id, kind: TaskKind::Task, date: day() })
            .await
            .unwrap();
        assert_eq!(r.order, 0);

        let t = tasks::get_task(&pool, t.id).await.unwrap();
        assert_eq!(t.service_date, Some(day()));
        assert_eq!(t.task_status, TaskStatus::Processing);
        let sheet = load_sheet(&pool, driver, day()).await.unwrap();
        assert_eq!(sheet.jobs_pending, vec![t.id]);
    }

    #[tokio::test]
    async fn test_unassign_retracts_from_sheet() {
        let pool = test_pool().await;
        let (a, driver) = crewed_truck(&pool, "A").await;
        let t1 = tasks::create_task(&pool, sample("Ada")).await.unwrap();
        let t2 = tasks::create_task(&pool, sample("Bob")).await.unwrap();
        let tip = tipping::create(
            &pool,
            &TippingRequestCreate {
                driver_id: driver,
                truck_id: Some(a),
                site_name: "North tip".into(),
                weight_kg: 300.0,
                cost: 25.0,
                note: None,
            },
        )
        .await
        .unwrap();
        for (id, kind) in [(t1.id, TaskKind::Task), (tip.id, TaskKind::TippingRequest), (t2.id, TaskKind::Task)] {
            assign(&pool, a, TaskAssign { task_id: id, kind, date: day() }).await.unwrap();
        }

        let sheet = load_sheet(&pool, driver, day()).await.unwrap();
        assert_eq!(sheet.jobs_not_started, vec![t1.id, t2.id]);
        assert_eq!(sheet.tipping_requests, vec![tip.id]);

        unassign(&pool, a, TaskUnassign { task_id: t1.id, date: day() }).await.unwrap();
        unassign(&pool, a, TaskUnassign { task_id: tip.id, date: day() }).await.unwrap();

        let refs = tasks_for_date(&pool, a, day()).await.unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!((refs[0].task_id, refs[0].order), (t2.id, 0));

        let sheet = load_sheet(&pool, driver, day()).await.unwrap();
        assert_eq!(sheet.jobs_not_started, vec![t2.id]);
        assert!(sheet.tipping_requests.is_empty());

        let err = unassign(&pool, a, TaskUnassign { task_id: t1.id, date: day() })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TaskRefNotFound);

        // Freed task can go to another truck
        let (b, _) = crewed_truck(&pool, "B").await;
        assign(&pool, b, TaskAssign { task_id: t1.id, kind: TaskKind::Task, date: day() })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_index_of_unknown_truck() {
        let pool = test_pool().await;
        let err = index(&pool, 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TruckNotFound);
    }
}
