//! Task API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/tasks | GET, POST | 列表 (date/status/payment_status 过滤), 创建 |
//! | /api/tasks/{id} | GET | 详情 (含明细、照片、所属车辆) |
//! | /api/tasks/{id}/status | POST | 状态变更 + 日报表对账 |
//! | /api/tasks/{id}/payment | POST | 付款结果写入 |
//! | /api/tasks/{id}/photos | POST | 附加服务照片 URL |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tasks", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", post(handler::change_status))
        .route("/{id}/payment", post(handler::record_payment))
        .route("/{id}/photos", post(handler::attach_photo))
}
