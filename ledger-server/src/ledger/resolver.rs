//! Dispatch index references to the Task or TippingRequest they name.

use std::collections::HashMap;

use chrono::NaiveDate;
use shared::models::{ResolvedTaskRef, TaskKind};
use sqlx::SqlitePool;

use super::registry::get_truck;
use crate::db::repository::{RepoError, task, tipping, truck};
use crate::utils::AppResult;

/// Resolve the truck's list for `date`, keeping order. References whose
/// entity is gone come back as [`ResolvedTaskRef::Unresolved`].
pub async fn resolve_tasks_for_date(
    pool: &SqlitePool,
    truck_id: i64,
    date: NaiveDate,
) -> AppResult<Vec<ResolvedTaskRef>> {
    get_truck(pool, truck_id).await?;
    let mut conn = pool.acquire().await.map_err(RepoError::from)?;
    let refs = truck::refs_for_date(&mut *conn, truck_id, date).await?;

    let ids_of = |kind: TaskKind| -> Vec<i64> {
        refs.iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.task_id)
            .collect()
    };
    let task_ids = ids_of(TaskKind::Task);
    let tipping_ids = ids_of(TaskKind::TippingRequest);

    let mut tasks: HashMap<i64, _> = HashMap::new();
    for mut t in task::find_by_ids(&mut *conn, &task_ids).await? {
        task::load_relations(&mut conn, &mut t).await?;
        tasks.insert(t.id, t);
    }
    let mut requests: HashMap<i64, _> = tipping::find_by_ids(&mut *conn, &tipping_ids)
        .await?
        .into_iter()
        .map(|r| (r.id, r))
        .collect();

    let resolved = refs
        .into_iter()
        .map(|reference| {
            let order = reference.order;
            match reference.kind {
                TaskKind::Task => match tasks.remove(&reference.task_id) {
                    Some(t) => ResolvedTaskRef::Task { order, task: Box::new(t) },
                    None => unresolved(truck_id, reference),
                },
                TaskKind::TippingRequest => match requests.remove(&reference.task_id) {
                    Some(request) => ResolvedTaskRef::TippingRequest { order, request },
                    None => unresolved(truck_id, reference),
                },
            }
        })
        .collect();
    Ok(resolved)
}

fn unresolved(truck_id: i64, reference: shared::models::TaskRef) -> ResolvedTaskRef {
    tracing::warn!(
        truck_id,
        task_id = reference.task_id,
        kind = ?reference.kind,
        "Index reference points at a missing entity"
    );
    ResolvedTaskRef::Unresolved { reference }
}
