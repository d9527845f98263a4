//! Task Repository

use super::{RepoError, RepoResult, counter};
use chrono::NaiveDate;
use shared::models::{
    PaymentMethod, PaymentStatus, Task, TaskCreate, TaskFilter, TaskItem, TaskKind, TaskStatus,
};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, order_number, client_name, client_phone, client_email, collection_address, service_date, time_window, task_status, payment_status, payment_method, cash_received, total_price, note, created_at, updated_at";

pub async fn find_by_id<'e>(db: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<Task>> {
    let sql = format!("SELECT {COLUMNS} FROM task WHERE id = ?");
    let task = sqlx::query_as::<_, Task>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(task)
}

/// Task with items, proof photos and derived truck id
pub async fn find_detail(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Task>> {
    let Some(mut task) = find_by_id(&mut *conn, id).await? else {
        return Ok(None);
    };
    load_relations(conn, &mut task).await?;
    Ok(Some(task))
}

pub async fn load_relations(conn: &mut SqliteConnection, task: &mut Task) -> RepoResult<()> {
    task.items = sqlx::query_as::<_, TaskItem>(
        "SELECT id, task_id, catalog_item_id, description, quantity, position, unit_price FROM task_item WHERE task_id = ? ORDER BY id",
    )
    .bind(task.id)
    .fetch_all(&mut *conn)
    .await?;

    task.proof_photos = sqlx::query_scalar::<_, String>(
        "SELECT url FROM task_photo WHERE task_id = ? ORDER BY created_at, id",
    )
    .bind(task.id)
    .fetch_all(&mut *conn)
    .await?;

    task.truck_id = sqlx::query_scalar::<_, i64>(
        "SELECT truck_id FROM truck_task_ref WHERE kind = ? AND task_id = ?",
    )
    .bind(TaskKind::Task)
    .bind(task.id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(())
}

/// Tasks by id, in no particular order. Missing ids are skipped.
pub async fn find_by_ids<'e>(db: impl SqliteExecutor<'e>, ids: &[i64]) -> RepoResult<Vec<Task>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!("SELECT {COLUMNS} FROM task WHERE id IN ("));
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
    let tasks = qb.build_query_as::<Task>().fetch_all(db).await?;
    Ok(tasks)
}

pub async fn list(pool: &SqlitePool, filter: &TaskFilter) -> RepoResult<Vec<Task>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!("SELECT {COLUMNS} FROM task WHERE 1 = 1"));
    if let Some(date) = filter.date {
        qb.push(" AND service_date = ").push_bind(date);
    }
    if let Some(status) = filter.status {
        qb.push(" AND task_status = ").push_bind(status);
    }
    if let Some(payment_status) = filter.payment_status {
        qb.push(" AND payment_status = ").push_bind(payment_status);
    }
    qb.push(" ORDER BY order_number DESC");
    let tasks = qb.build_query_as::<Task>().fetch_all(pool).await?;
    Ok(tasks)
}

/// Insert a task and its items. Allocates the order number from the shared
/// counter on the same connection, so it must run inside a transaction.
pub async fn create(
    conn: &mut SqliteConnection,
    data: &TaskCreate,
    total_price: f64,
) -> RepoResult<Task> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let order_number = counter::next_value(conn, counter::TASK_ORDER_NUMBER).await?;
    let status = if data.start_processing {
        TaskStatus::Processing
    } else {
        TaskStatus::NotCompleted
    };

    sqlx::query(
        "INSERT INTO task (id, order_number, client_name, client_phone, client_email, collection_address, service_date, time_window, task_status, payment_status, payment_method, cash_received, total_price, note, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'UNPAID', NULL, 0, ?10, ?11, ?12, ?12)",
    )
    .bind(id)
    .bind(order_number)
    .bind(&data.client_name)
    .bind(&data.client_phone)
    .bind(&data.client_email)
    .bind(&data.collection_address)
    .bind(data.service_date)
    .bind(data.time_window)
    .bind(status)
    .bind(total_price)
    .bind(&data.note)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    for item in &data.items {
        sqlx::query(
            "INSERT INTO task_item (id, task_id, catalog_item_id, description, quantity, position, unit_price) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(shared::util::snowflake_id())
        .bind(id)
        .bind(item.catalog_item_id)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.position)
        .bind(item.unit_price)
        .execute(&mut *conn)
        .await?;
    }

    find_detail(conn, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create task".into()))
}

pub async fn set_status<'e>(db: impl SqliteExecutor<'e>, id: i64, status: TaskStatus) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE task SET task_status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(db)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Task {id} not found")));
    }
    Ok(())
}

pub async fn set_service_date<'e>(
    db: impl SqliteExecutor<'e>,
    id: i64,
    date: NaiveDate,
) -> RepoResult<()> {
    sqlx::query("UPDATE task SET service_date = ?, updated_at = ? WHERE id = ?")
        .bind(date)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

/// Write a payment result. `None` fields keep their stored value.
pub async fn record_payment<'e>(
    db: impl SqliteExecutor<'e>,
    id: i64,
    status: PaymentStatus,
    method: Option<PaymentMethod>,
    cash_received: Option<f64>,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE task SET payment_status = ?1, payment_method = COALESCE(?2, payment_method), cash_received = COALESCE(?3, cash_received), updated_at = ?4 WHERE id = ?5",
    )
    .bind(status)
    .bind(method)
    .bind(cash_received)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(db)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Task {id} not found")));
    }
    Ok(())
}

pub async fn add_photo<'e>(db: impl SqliteExecutor<'e>, task_id: i64, url: &str) -> RepoResult<()> {
    sqlx::query("INSERT INTO task_photo (id, task_id, url, created_at) VALUES (?, ?, ?, ?)")
        .bind(shared::util::snowflake_id())
        .bind(task_id)
        .bind(url)
        .bind(shared::util::now_millis())
        .execute(db)
        .await?;
    Ok(())
}

/// COMPLETED jobs still owing money, serviced before `before`, not reminded
/// since `reminded_before` (millis).
pub async fn find_unpaid_completed(
    pool: &SqlitePool,
    before: NaiveDate,
    reminded_before: i64,
) -> RepoResult<Vec<Task>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM task WHERE task_status = 'COMPLETED' AND payment_status IN ('UNPAID', 'PARTIAL_PAID', 'FAILED') AND service_date IS NOT NULL AND service_date < ? AND (payment_reminder_at IS NULL OR payment_reminder_at < ?) ORDER BY service_date, order_number"
    );
    let tasks = sqlx::query_as::<_, Task>(&sql)
        .bind(before)
        .bind(reminded_before)
        .fetch_all(pool)
        .await?;
    Ok(tasks)
}

pub async fn mark_reminded(pool: &SqlitePool, id: i64, at: i64) -> RepoResult<()> {
    sqlx::query("UPDATE task SET payment_reminder_at = ? WHERE id = ?")
        .bind(at)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::repository::test_pool;
    use shared::models::{ItemPosition, TaskItemInput, TimeWindow};

    pub(crate) fn sample(client: &str) -> TaskCreate {
        TaskCreate {
            client_name: client.into(),
            client_phone: None,
            client_email: None,
            collection_address: "1 High St".into(),
            service_date: None,
            time_window: TimeWindow::Morning,
            items: vec![TaskItemInput {
                catalog_item_id: None,
                description: Some("Sofa".into()),
                quantity: 1,
                position: ItemPosition::Inside,
                unit_price: 60.0,
            }],
            start_processing: false,
            note: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_order_numbers_and_items() {
        let pool = test_pool().await;
        let mut tx = pool.begin().await.unwrap();
        let a = create(&mut tx, &sample("A"), 60.0).await.unwrap();
        let b = create(&mut tx, &sample("B"), 60.0).await.unwrap();
        tx.commit().await.unwrap();

        assert!(b.order_number > a.order_number);
        assert_eq!(a.task_status, TaskStatus::NotCompleted);
        assert_eq!(a.payment_status, PaymentStatus::Unpaid);
        assert_eq!(a.items.len(), 1);
        assert_eq!(a.items[0].position, ItemPosition::Inside);
        assert_eq!(a.truck_id, None);
    }

    #[tokio::test]
    async fn test_record_payment_keeps_unspecified_fields() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let t = create(&mut conn, &sample("A"), 60.0).await.unwrap();
        drop(conn);

        record_payment(&pool, t.id, PaymentStatus::PartialPaid, Some(PaymentMethod::Cash), Some(20.0))
            .await
            .unwrap();
        record_payment(&pool, t.id, PaymentStatus::Paid, None, None)
            .await
            .unwrap();

        let t = find_by_id(&pool, t.id).await.unwrap().unwrap();
        assert_eq!(t.payment_status, PaymentStatus::Paid);
        assert_eq!(t.payment_method, Some(PaymentMethod::Cash));
        assert_eq!(t.cash_received, 20.0);
    }

    #[tokio::test]
    async fn test_list_filters_by_date_and_status() {
        let pool = test_pool().await;
        let day = NaiveDate::from_ymd_opt(2026, 5, 2).unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let a = create(&mut conn, &sample("A"), 1.0).await.unwrap();
        let _b = create(&mut conn, &sample("B"), 1.0).await.unwrap();
        drop(conn);
        set_service_date(&pool, a.id, day).await.unwrap();
        set_status(&pool, a.id, TaskStatus::Processing).await.unwrap();

        let by_date = list(&pool, &TaskFilter { date: Some(day), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(by_date.len(), 1);
        assert_eq!(by_date[0].service_date, Some(day));

        let not_started = list(
            &pool,
            &TaskFilter {
                status: Some(TaskStatus::NotCompleted),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(not_started.len(), 1);
        assert_eq!(not_started[0].client_name, "B");
    }

    #[tokio::test]
    async fn test_unpaid_completed_respects_reminder_time() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let t = create(&mut conn, &sample("A"), 1.0).await.unwrap();
        drop(conn);
        let day = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        set_service_date(&pool, t.id, day).await.unwrap();
        set_status(&pool, t.id, TaskStatus::Completed).await.unwrap();

        let cutoff = day.succ_opt().unwrap();
        let found = find_unpaid_completed(&pool, cutoff, 1_000).await.unwrap();
        assert_eq!(found.len(), 1);
        // Same day is still within grace
        assert!(find_unpaid_completed(&pool, day, 1_000).await.unwrap().is_empty());

        mark_reminded(&pool, t.id, 5_000).await.unwrap();
        assert!(find_unpaid_completed(&pool, cutoff, 1_000).await.unwrap().is_empty());
        assert_eq!(find_unpaid_completed(&pool, cutoff, 6_000).await.unwrap().len(), 1);
    }
}
