//! Daily Sheet API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/daily-sheets/generate | POST | 生成 (指定司机或全部, 默认今天) |
//! | /api/daily-sheets/{driver_id}/{date} | GET | 读取日报表 |
//! | /api/daily-sheets/{driver_id}/{date}/fuel | POST | 追加加油记录 |
//! | /api/daily-sheets/{driver_id}/{date}/expenses | POST | 追加费用 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/daily-sheets", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/generate", post(handler::generate))
        .route("/{driver_id}/{date}", get(handler::get_sheet))
        .route("/{driver_id}/{date}/fuel", post(handler::add_fuel))
        .route("/{driver_id}/{date}/expenses", post(handler::add_expense))
}
