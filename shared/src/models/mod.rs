//! Data models
//!
//! Shared between ledger-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflake ids.

pub mod daily_sheet;
pub mod employee;
pub mod payroll;
pub mod task;
pub mod tipping;
pub mod truck;

// Re-exports
pub use daily_sheet::*;
pub use employee::*;
pub use payroll::*;
pub use task::*;
pub use tipping::*;
pub use truck::*;
