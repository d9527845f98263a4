//! Truck Model and per-date task index

use super::task::Task;
use super::tipping::TippingRequest;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Truck entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Truck {
    pub id: i64,
    pub name: String,
    pub plate: Option<String>,
    pub driver_id: Option<i64>,
    pub helper_id: Option<i64>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create truck payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TruckCreate {
    pub name: String,
    pub plate: Option<String>,
    pub driver_id: Option<i64>,
    pub helper_id: Option<i64>,
}

/// Update truck payload
///
/// `driver_id` / `helper_id` are applied as given: `null` clears the seat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TruckUpdate {
    pub name: Option<String>,
    pub plate: Option<String>,
    pub is_active: Option<bool>,
    pub driver_id: Option<i64>,
    pub helper_id: Option<i64>,
}

/// What a [`TaskRef`] points at
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum TaskKind {
    #[default]
    Task,
    TippingRequest,
}

/// One entry of a truck's per-date index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TaskRef {
    pub task_id: i64,
    pub kind: TaskKind,
    /// Position within the date's list
    #[cfg_attr(feature = "db", sqlx(rename = "sort_order"))]
    pub order: i32,
}

/// Full index of a truck: date -> ordered references
pub type TruckIndex = BTreeMap<NaiveDate, Vec<TaskRef>>;

/// Assign payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAssign {
    pub task_id: i64,
    #[serde(default)]
    pub kind: TaskKind,
    pub date: NaiveDate,
}

/// Unassign payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskUnassign {
    pub task_id: i64,
    pub date: NaiveDate,
}

/// A [`TaskRef`] dispatched to its entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "resolution", rename_all = "snake_case")]
pub enum ResolvedTaskRef {
    Task { order: i32, task: Box<Task> },
    TippingRequest { order: i32, request: TippingRequest },
    /// Entity missing; the bare reference is kept
    Unresolved { reference: TaskRef },
}

impl ResolvedTaskRef {
    pub fn order(&self) -> i32 {
        match self {
            Self::Task { order, .. } | Self::TippingRequest { order, .. } => *order,
            Self::Unresolved { reference } => reference.order,
        }
    }
}
