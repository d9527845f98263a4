//! Employee Model

use serde::{Deserialize, Serialize};

/// Default daily hours paid at the regular rate
pub const DEFAULT_REGULAR_HOURS_LIMIT: f64 = 8.0;

/// Employee role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum EmployeeRole {
    Admin,
    Driver,
    Helper,
}

/// Employee entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: EmployeeRole,
    /// Pay per regular hour
    pub hour_rate: f64,
    /// Pay per hour beyond `regular_hours_limit`
    pub overtime_rate: f64,
    /// Hours per shift paid at the regular rate
    pub regular_hours_limit: f64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create employee payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCreate {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: EmployeeRole,
    #[serde(default)]
    pub hour_rate: f64,
    #[serde(default)]
    pub overtime_rate: f64,
    pub regular_hours_limit: Option<f64>,
}

/// Update employee payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: Option<EmployeeRole>,
    pub hour_rate: Option<f64>,
    pub overtime_rate: Option<f64>,
    pub regular_hours_limit: Option<f64>,
    pub is_active: Option<bool>,
}

/// Running pay balance since the last reset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningTotals {
    pub user_id: i64,
    pub total_hours_worked: f64,
    pub total_salary: f64,
    /// Time of the last RESET entry, if any
    pub since: Option<i64>,
}
