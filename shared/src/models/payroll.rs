//! Payroll Model (shift records and settlement ledger)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PayrollStatus {
    #[default]
    Pending,
    Paid,
}

/// One shift of one employee
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payroll {
    pub id: i64,
    pub user_id: i64,
    /// Unix millis
    pub start_time: i64,
    /// Unix millis, None while the shift is open
    pub end_time: Option<i64>,
    pub total_hours: f64,
    pub regular_hours: f64,
    pub overtime_hours: f64,
    pub salary: f64,
    /// Cash collected on the shift's daily sheet
    pub total_cash: f64,
    /// Expenses the employee logged on that sheet
    pub total_expenses: f64,
    pub status: PayrollStatus,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Payroll {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftStart {
    pub user_id: i64,
    /// Defaults to now
    pub start_time: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftEnd {
    pub user_id: i64,
    /// Defaults to now
    pub end_time: Option<i64>,
}

/// Admin correction of a closed shift
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayrollCorrection {
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub note: Option<String>,
}

/// Payroll list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayrollFilter {
    pub user_id: Option<i64>,
    /// Shift start lower bound (inclusive, millis)
    pub from: Option<i64>,
    /// Shift start upper bound (exclusive, millis)
    pub to: Option<i64>,
}

/// Settlement ledger entry kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum SettlementKind {
    /// Shift ended, pay accrued
    Earned,
    /// Shift paid out (negative hours/amount)
    Paid,
    /// Correction delta of a closed shift
    Adjusted,
    /// Balance restarts from zero
    Reset,
}

/// Append-only settlement entry; the running balance is the sum of the
/// entries after the latest RESET.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ShiftSettlement {
    pub id: i64,
    pub user_id: i64,
    pub payroll_id: Option<i64>,
    pub kind: SettlementKind,
    pub hours: f64,
    pub amount: f64,
    pub created_at: i64,
}
