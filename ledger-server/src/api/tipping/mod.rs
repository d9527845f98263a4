//! Tipping Request API Module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/tipping-requests", post(handler::create))
        .route("/api/tipping-requests/{id}", get(handler::get_by_id))
}
