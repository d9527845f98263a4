//! Tipping Request Model (driver disposal trips)

use serde::{Deserialize, Serialize};

/// Tipping request entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TippingRequest {
    pub id: i64,
    pub driver_id: i64,
    pub truck_id: Option<i64>,
    pub site_name: String,
    pub weight_kg: f64,
    pub cost: f64,
    pub note: Option<String>,
    pub created_at: i64,
}

/// Create tipping request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TippingRequestCreate {
    pub driver_id: i64,
    pub truck_id: Option<i64>,
    pub site_name: String,
    #[serde(default)]
    pub weight_kg: f64,
    #[serde(default)]
    pub cost: f64,
    pub note: Option<String>,
}
