//! Task Model (collection jobs)

use super::daily_sheet::JobBucket;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Task lifecycle status
///
/// ```text
/// NOT_COMPLETED -> PROCESSING -> COMPLETED | CANCELLED | ON_HOLD
/// ON_HOLD <-> PROCESSING
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum TaskStatus {
    NotCompleted,
    Processing,
    Completed,
    Cancelled,
    OnHold,
}

impl TaskStatus {
    /// COMPLETED and CANCELLED end the lifecycle
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether `next` is an edge of the lifecycle graph
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (NotCompleted, Processing)
                | (Processing, Completed)
                | (Processing, Cancelled)
                | (Processing, OnHold)
                | (OnHold, Processing)
        )
    }

    /// Daily sheet bucket holding tasks in this status
    pub fn bucket(&self) -> JobBucket {
        match self {
            Self::Completed => JobBucket::Done,
            Self::Processing => JobBucket::Pending,
            Self::Cancelled => JobBucket::Cancelled,
            Self::OnHold => JobBucket::OnHold,
            Self::NotCompleted => JobBucket::NotStarted,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotCompleted => "NOT_COMPLETED",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::OnHold => "ON_HOLD",
        }
    }
}

/// Payment status, written by the payment gateway result
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentStatus {
    Unpaid,
    PartialPaid,
    Paid,
    PartialRefunded,
    Refunded,
    Failed,
}

impl PaymentStatus {
    /// Money is still owed on the job
    pub fn is_outstanding(&self) -> bool {
        matches!(self, Self::Unpaid | Self::PartialPaid | Self::Failed)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    Online,
}

/// Where the waste sits relative to the property
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ItemPosition {
    #[default]
    Outside,
    Inside,
    InsideWithDismantling,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum TimeWindow {
    #[default]
    AnyTime,
    Morning,
    Afternoon,
}

/// Task entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Task {
    pub id: i64,
    /// Human-facing number, unique and never reused
    pub order_number: i64,
    pub client_name: String,
    pub client_phone: Option<String>,
    pub client_email: Option<String>,
    pub collection_address: String,
    /// Day the job is scheduled on, set by truck assignment
    pub service_date: Option<NaiveDate>,
    pub time_window: TimeWindow,
    pub task_status: TaskStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub cash_received: f64,
    pub total_price: f64,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --

    /// Derived from the truck index
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub truck_id: Option<i64>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<TaskItem>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub proof_photos: Vec<String>,
}

/// Task line item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TaskItem {
    pub id: i64,
    pub task_id: i64,
    pub catalog_item_id: Option<i64>,
    pub description: Option<String>,
    pub quantity: i32,
    pub position: ItemPosition,
    pub unit_price: f64,
}

/// Line item input (create)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskItemInput {
    pub catalog_item_id: Option<i64>,
    pub description: Option<String>,
    pub quantity: i32,
    #[serde(default)]
    pub position: ItemPosition,
    pub unit_price: f64,
}

/// Create task payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCreate {
    pub client_name: String,
    pub client_phone: Option<String>,
    pub client_email: Option<String>,
    pub collection_address: String,
    pub service_date: Option<NaiveDate>,
    #[serde(default)]
    pub time_window: TimeWindow,
    pub items: Vec<TaskItemInput>,
    /// Start in PROCESSING instead of NOT_COMPLETED
    #[serde(default)]
    pub start_processing: bool,
    pub note: Option<String>,
}

/// Status change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatusChange {
    pub status: TaskStatus,
}

/// Payment result payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPaymentUpdate {
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub cash_received: Option<f64>,
}

/// Proof photo payload (URL returned by file storage)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPhotoAttach {
    pub url: String,
}

/// Task list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    pub date: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
    pub payment_status: Option<PaymentStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_graph_edges() {
        use TaskStatus::*;
        assert!(NotCompleted.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(OnHold));
        assert!(OnHold.can_transition_to(Processing));

        assert!(!NotCompleted.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Processing));
        assert!(!Cancelled.can_transition_to(Processing));
        assert!(!OnHold.can_transition_to(Completed));
    }

    #[test]
    fn every_status_has_a_bucket() {
        assert_eq!(TaskStatus::Completed.bucket(), JobBucket::Done);
        assert_eq!(TaskStatus::Processing.bucket(), JobBucket::Pending);
        assert_eq!(TaskStatus::Cancelled.bucket(), JobBucket::Cancelled);
        assert_eq!(TaskStatus::OnHold.bucket(), JobBucket::OnHold);
        assert_eq!(TaskStatus::NotCompleted.bucket(), JobBucket::NotStarted);
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::NotCompleted).unwrap(),
            "\"NOT_COMPLETED\""
        );
        let s: PaymentMethod = serde_json::from_str("\"BANK_TRANSFER\"").unwrap();
        assert_eq!(s, PaymentMethod::BankTransfer);
        assert_eq!(TaskStatus::OnHold.as_str(), "ON_HOLD");
    }
}
