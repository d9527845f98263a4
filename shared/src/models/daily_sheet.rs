//! Daily Sheet Model (per-driver, per-day ledger)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Job bucket of a daily sheet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum JobBucket {
    Done,
    Pending,
    Cancelled,
    OnHold,
    NotStarted,
}

/// Daily sheet entity
///
/// A task id sits in at most one bucket; membership rows are keyed by
/// `(sheet_id, task_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DailySheet {
    pub id: i64,
    pub driver_id: i64,
    pub sheet_date: NaiveDate,
    /// Sum of cash received on linked CASH jobs
    pub total_cash: f64,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --

    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub jobs_done: Vec<i64>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub jobs_pending: Vec<i64>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub jobs_cancelled: Vec<i64>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub jobs_on_hold: Vec<i64>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub jobs_not_started: Vec<i64>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub tipping_requests: Vec<i64>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub fuel_logs: Vec<FuelLog>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub expenses: Vec<ExpenseEntry>,
}

impl DailySheet {
    pub fn bucket(&self, bucket: JobBucket) -> &[i64] {
        match bucket {
            JobBucket::Done => &self.jobs_done,
            JobBucket::Pending => &self.jobs_pending,
            JobBucket::Cancelled => &self.jobs_cancelled,
            JobBucket::OnHold => &self.jobs_on_hold,
            JobBucket::NotStarted => &self.jobs_not_started,
        }
    }

    pub fn bucket_mut(&mut self, bucket: JobBucket) -> &mut Vec<i64> {
        match bucket {
            JobBucket::Done => &mut self.jobs_done,
            JobBucket::Pending => &mut self.jobs_pending,
            JobBucket::Cancelled => &mut self.jobs_cancelled,
            JobBucket::OnHold => &mut self.jobs_on_hold,
            JobBucket::NotStarted => &mut self.jobs_not_started,
        }
    }

    /// Bucket currently holding `task_id`
    pub fn bucket_of(&self, task_id: i64) -> Option<JobBucket> {
        [
            JobBucket::Done,
            JobBucket::Pending,
            JobBucket::Cancelled,
            JobBucket::OnHold,
            JobBucket::NotStarted,
        ]
        .into_iter()
        .find(|b| self.bucket(*b).contains(&task_id))
    }

    pub fn total_expenses(&self) -> f64 {
        self.expenses.iter().map(|e| e.amount).sum()
    }
}

/// Fuel log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct FuelLog {
    pub id: i64,
    pub sheet_id: i64,
    pub added_by: i64,
    pub liters: f64,
    pub amount: f64,
    pub note: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelLogCreate {
    pub added_by: i64,
    pub liters: f64,
    pub amount: f64,
    pub note: Option<String>,
}

/// Expense entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ExpenseEntry {
    pub id: i64,
    pub sheet_id: i64,
    pub added_by: i64,
    pub description: String,
    pub amount: f64,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseCreate {
    pub added_by: i64,
    pub description: String,
    pub amount: f64,
}

/// Generate request (bulk when `driver_id` is absent, today when `date` is absent)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheetGenerate {
    pub date: Option<NaiveDate>,
    pub driver_id: Option<i64>,
}

/// Outcome of a bulk generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetGenerationSummary {
    pub date: NaiveDate,
    /// Driver ids whose sheet was written
    pub generated: Vec<i64>,
    pub failed: Vec<SheetGenerationFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetGenerationFailure {
    pub driver_id: i64,
    pub error: String,
}
