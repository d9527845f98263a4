//! Payroll API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/payroll | GET | 列表 (user_id/from/to 过滤) |
//! | /api/payroll/start | POST | 开班 |
//! | /api/payroll/end | POST | 收班并结算 |
//! | /api/payroll/{id} | GET, PUT | 详情, 管理员修正 |
//! | /api/payroll/{id}/mark-paid | POST | 标记已支付 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payroll", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/start", post(handler::start))
        .route("/end", post(handler::end))
        .route("/{id}", get(handler::get_by_id).put(handler::correct))
        .route("/{id}/mark-paid", post(handler::mark_paid))
}
