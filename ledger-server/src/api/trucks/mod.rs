//! Truck API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/trucks | GET, POST | 列表, 创建 |
//! | /api/trucks/{id} | GET, PUT | 详情, 更新 (司机/助手) |
//! | /api/trucks/{id}/index | GET | 完整日期索引 |
//! | /api/trucks/{id}/tasks/{date} | GET | 某日引用列表 (`?resolve=true` 解析实体) |
//! | /api/trucks/{id}/assign | POST | 分配任务或倾倒申请 |
//! | /api/trucks/{id}/unassign | POST | 取消分配 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/trucks", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .route("/{id}/index", get(handler::index))
        .route("/{id}/tasks/{date}", get(handler::tasks_for_date))
        .route("/{id}/assign", post(handler::assign))
        .route("/{id}/unassign", post(handler::unassign))
}
