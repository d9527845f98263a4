//! Shared types for the haulage ledger
//!
//! Models, the unified error system and small utilities used by
//! `ledger-server` and by API clients.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
