//! Payroll Repository
//!
//! Shift records plus the append-only `shift_settlement` ledger.
//! The partial unique index `idx_payroll_one_open` keeps one open shift per
//! user; a second open insert surfaces as [`RepoError::Duplicate`].

use super::{RepoError, RepoResult};
use shared::models::{Payroll, PayrollFilter, SettlementKind, ShiftSettlement};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, user_id, start_time, end_time, total_hours, regular_hours, overtime_hours, salary, total_cash, total_expenses, status, note, created_at, updated_at";

/// Computed figures written when a shift closes or is recomputed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayrollFigures {
    pub total_hours: f64,
    pub regular_hours: f64,
    pub overtime_hours: f64,
    pub salary: f64,
    pub total_cash: f64,
    pub total_expenses: f64,
}

pub async fn find_by_id<'e>(db: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<Payroll>> {
    let sql = format!("SELECT {COLUMNS} FROM payroll WHERE id = ?");
    let payroll = sqlx::query_as::<_, Payroll>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(payroll)
}

pub async fn find_open<'e>(db: impl SqliteExecutor<'e>, user_id: i64) -> RepoResult<Option<Payroll>> {
    let sql = format!("SELECT {COLUMNS} FROM payroll WHERE user_id = ? AND end_time IS NULL");
    let payroll = sqlx::query_as::<_, Payroll>(&sql)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
    Ok(payroll)
}

pub async fn list(pool: &SqlitePool, filter: &PayrollFilter) -> RepoResult<Vec<Payroll>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM payroll WHERE 1 = 1"));
    if let Some(user_id) = filter.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(from) = filter.from {
        qb.push(" AND start_time >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        qb.push(" AND start_time < ").push_bind(to);
    }
    qb.push(" ORDER BY start_time DESC");
    let rows = qb.build_query_as::<Payroll>().fetch_all(pool).await?;
    Ok(rows)
}

/// Open a shift. Fails with `Duplicate` if the user already has one open.
pub async fn insert_open<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: i64,
    start_time: i64,
) -> RepoResult<Payroll> {
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO payroll (id, user_id, start_time, status, created_at, updated_at) VALUES (?1, ?2, ?3, 'PENDING', ?4, ?4) RETURNING {COLUMNS}"
    );
    let payroll = sqlx::query_as::<_, Payroll>(&sql)
        .bind(shared::util::snowflake_id())
        .bind(user_id)
        .bind(start_time)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(payroll)
}

/// Write times and computed figures. Only PENDING rows are touched.
pub async fn write_figures<'e>(
    db: impl SqliteExecutor<'e>,
    id: i64,
    start_time: i64,
    end_time: i64,
    figures: &PayrollFigures,
    note: Option<&str>,
) -> RepoResult<Payroll> {
    let sql = format!(
        "UPDATE payroll SET start_time = ?, end_time = ?, total_hours = ?, regular_hours = ?, overtime_hours = ?, salary = ?, total_cash = ?, total_expenses = ?, note = COALESCE(?, note), updated_at = ? WHERE id = ? AND status = 'PENDING' RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Payroll>(&sql)
        .bind(start_time)
        .bind(end_time)
        .bind(figures.total_hours)
        .bind(figures.regular_hours)
        .bind(figures.overtime_hours)
        .bind(figures.salary)
        .bind(figures.total_cash)
        .bind(figures.total_expenses)
        .bind(note)
        .bind(shared::util::now_millis())
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::Conflict(format!("Payroll {id} is not pending")))
}

/// PENDING → PAID. Fails with `Conflict` when the row is already paid.
pub async fn mark_paid<'e>(db: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Payroll> {
    let sql = format!(
        "UPDATE payroll SET status = 'PAID', updated_at = ? WHERE id = ? AND status = 'PENDING' RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Payroll>(&sql)
        .bind(shared::util::now_millis())
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::Conflict(format!("Payroll {id} is already paid")))
}

// ── Settlement ledger ───────────────────────────────────────────────

pub async fn append_settlement<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: i64,
    payroll_id: Option<i64>,
    kind: SettlementKind,
    hours: f64,
    amount: f64,
) -> RepoResult<ShiftSettlement> {
    let entry = sqlx::query_as::<_, ShiftSettlement>(
        "INSERT INTO shift_settlement (user_id, payroll_id, kind, hours, amount, created_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING id, user_id, payroll_id, kind, hours, amount, created_at",
    )
    .bind(user_id)
    .bind(payroll_id)
    .bind(kind)
    .bind(hours)
    .bind(amount)
    .bind(shared::util::now_millis())
    .fetch_one(db)
    .await?;
    Ok(entry)
}

/// Entries after the user's latest RESET, oldest first
pub async fn settlements_since_reset<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: i64,
) -> RepoResult<Vec<ShiftSettlement>> {
    let entries = sqlx::query_as::<_, ShiftSettlement>(
        "SELECT id, user_id, payroll_id, kind, hours, amount, created_at FROM shift_settlement WHERE user_id = ?1 AND id > COALESCE((SELECT MAX(id) FROM shift_settlement WHERE user_id = ?1 AND kind = 'RESET'), 0) ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(entries)
}

/// Timestamp of the latest RESET, if any
pub async fn last_reset_at<'e>(db: impl SqliteExecutor<'e>, user_id: i64) -> RepoResult<Option<i64>> {
    let at = sqlx::query_scalar::<_, i64>(
        "SELECT created_at FROM shift_settlement WHERE user_id = ? AND kind = 'RESET' ORDER BY id DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{employee, test_pool};
    use shared::models::{EmployeeCreate, EmployeeRole, PayrollStatus};

    async fn helper(pool: &SqlitePool) -> i64 {
        employee::create(
            pool,
            EmployeeCreate {
                name: "Sam".into(),
                phone: None,
                email: None,
                role: EmployeeRole::Helper,
                hour_rate: 10.0,
                overtime_rate: 15.0,
                regular_hours_limit: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    fn figures(hours: f64, salary: f64) -> PayrollFigures {
        PayrollFigures {
            total_hours: hours,
            regular_hours: hours,
            overtime_hours: 0.0,
            salary,
            total_cash: 0.0,
            total_expenses: 0.0,
        }
    }

    #[tokio::test]
    async fn test_one_open_shift_per_user() {
        let pool = test_pool().await;
        let u = helper(&pool).await;
        let open = insert_open(&pool, u, 1_000).await.unwrap();
        assert!(open.is_open());

        let err = insert_open(&pool, u, 2_000).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        // Closing frees the slot
        write_figures(&pool, open.id, 1_000, 3_600_000, &figures(1.0, 10.0), None)
            .await
            .unwrap();
        assert!(find_open(&pool, u).await.unwrap().is_none());
        insert_open(&pool, u, 4_000_000).await.unwrap();
    }

    #[tokio::test]
    async fn test_mark_paid_once() {
        let pool = test_pool().await;
        let u = helper(&pool).await;
        let p = insert_open(&pool, u, 0).await.unwrap();
        write_figures(&pool, p.id, 0, 3_600_000, &figures(1.0, 10.0), Some("first"))
            .await
            .unwrap();

        let paid = mark_paid(&pool, p.id).await.unwrap();
        assert_eq!(paid.status, PayrollStatus::Paid);
        assert_eq!(paid.note.as_deref(), Some("first"));
        assert!(matches!(mark_paid(&pool, p.id).await, Err(RepoError::Conflict(_))));
        assert!(matches!(
            write_figures(&pool, p.id, 0, 1, &figures(0.0, 0.0), None).await,
            Err(RepoError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_settlements_fold_after_reset() {
        let pool = test_pool().await;
        let u = helper(&pool).await;
        append_settlement(&pool, u, None, SettlementKind::Earned, 8.0, 80.0).await.unwrap();
        append_settlement(&pool, u, None, SettlementKind::Reset, 0.0, 0.0).await.unwrap();
        append_settlement(&pool, u, None, SettlementKind::Earned, 2.0, 20.0).await.unwrap();
        append_settlement(&pool, u, None, SettlementKind::Adjusted, 0.5, 5.0).await.unwrap();

        let entries = settlements_since_reset(&pool, u).await.unwrap();
        assert_eq!(entries.len(), 2);
        let since = last_reset_at(&pool, u).await.unwrap();
        assert!(since.is_some());

        let hours: f64 = entries.iter().map(|e| e.hours).sum();
        assert_eq!(hours, 2.5);
        assert_eq!(entries[1].kind, SettlementKind::Adjusted);
    }

    #[tokio::test]
    async fn test_list_filters_by_user() {
        let pool = test_pool().await;
        let a = helper(&pool).await;
        let b = helper(&pool).await;
        insert_open(&pool, a, 10).await.unwrap();
        insert_open(&pool, b, 20).await.unwrap();

        let only_a = list(&pool, &PayrollFilter { user_id: Some(a), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].user_id, a);

        let window = list(&pool, &PayrollFilter { from: Some(15), to: Some(25), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].user_id, b);
    }
}
