//! Employee Repository

use super::{RepoError, RepoResult};
use shared::models::{DEFAULT_REGULAR_HOURS_LIMIT, Employee, EmployeeCreate, EmployeeUpdate};
use sqlx::{SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, name, phone, email, role, hour_rate, overtime_rate, regular_hours_limit, is_active, created_at, updated_at";

pub async fn find_by_id<'e>(db: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<Employee>> {
    let sql = format!("SELECT {COLUMNS} FROM employee WHERE id = ?");
    let employee = sqlx::query_as::<_, Employee>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(employee)
}

pub async fn find_all(pool: &SqlitePool, include_inactive: bool) -> RepoResult<Vec<Employee>> {
    let sql = if include_inactive {
        format!("SELECT {COLUMNS} FROM employee ORDER BY name")
    } else {
        format!("SELECT {COLUMNS} FROM employee WHERE is_active = 1 ORDER BY name")
    };
    let employees = sqlx::query_as::<_, Employee>(&sql).fetch_all(pool).await?;
    Ok(employees)
}

pub async fn create(pool: &SqlitePool, data: EmployeeCreate) -> RepoResult<Employee> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO employee (id, name, phone, email, role, hour_rate, overtime_rate, regular_hours_limit, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9, ?9)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.phone)
    .bind(&data.email)
    .bind(data.role)
    .bind(data.hour_rate)
    .bind(data.overtime_rate)
    .bind(data.regular_hours_limit.unwrap_or(DEFAULT_REGULAR_HOURS_LIMIT))
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create employee".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: EmployeeUpdate) -> RepoResult<Employee> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE employee SET name = COALESCE(?1, name), phone = COALESCE(?2, phone), email = COALESCE(?3, email), role = COALESCE(?4, role), hour_rate = COALESCE(?5, hour_rate), overtime_rate = COALESCE(?6, overtime_rate), regular_hours_limit = COALESCE(?7, regular_hours_limit), is_active = COALESCE(?8, is_active), updated_at = ?9 WHERE id = ?10",
    )
    .bind(data.name)
    .bind(data.phone)
    .bind(data.email)
    .bind(data.role)
    .bind(data.hour_rate)
    .bind(data.overtime_rate)
    .bind(data.regular_hours_limit)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Employee {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Employee {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_pool;
    use shared::models::EmployeeRole;

    fn driver(name: &str) -> EmployeeCreate {
        EmployeeCreate {
            name: name.into(),
            phone: None,
            email: None,
            role: EmployeeRole::Driver,
            hour_rate: 10.0,
            overtime_rate: 15.0,
            regular_hours_limit: None,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_regular_hours_limit() {
        let pool = test_pool().await;
        let e = create(&pool, driver("Dana")).await.unwrap();
        assert_eq!(e.role, EmployeeRole::Driver);
        assert_eq!(e.regular_hours_limit, 8.0);
        assert!(e.is_active);
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let pool = test_pool().await;
        let e = create(&pool, driver("Dana")).await.unwrap();
        let updated = update(
            &pool,
            e.id,
            EmployeeUpdate {
                hour_rate: Some(12.0),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Dana");
        assert_eq!(updated.hour_rate, 12.0);
        assert_eq!(updated.overtime_rate, 15.0);
        assert!(!updated.is_active);

        assert!(find_all(&pool, false).await.unwrap().is_empty());
        assert_eq!(find_all(&pool, true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing() {
        let pool = test_pool().await;
        let err = update(&pool, 42, EmployeeUpdate::default()).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
