//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`employees`] - 员工和工资累计
//! - [`tasks`] - 任务 (状态、付款、照片)
//! - [`trucks`] - 车辆和按日期任务索引
//! - [`tipping`] - 倾倒申请
//! - [`daily_sheets`] - 司机日报表
//! - [`payroll`] - 班次与工资结算
//!
//! 所有响应使用 [`ApiResponse`](crate::utils::ApiResponse) 信封。

pub mod daily_sheets;
pub mod employees;
pub mod health;
pub mod payroll;
pub mod tasks;
pub mod tipping;
pub mod trucks;

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    tracing::info!(target: "http_access", %method, %uri, status = response.status().as_u16(), "request");
    response
}

/// Build the Axum router (without state)
pub fn build_router() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(employees::router())
        .merge(tasks::router())
        .merge(trucks::router())
        .merge(tipping::router())
        .merge(daily_sheets::router())
        .merge(payroll::router())
}

/// Build a fully configured application with all middleware and state
///
/// Used by the HTTP server and by router tests (`oneshot`)
pub fn build_app(state: ServerState) -> Router {
    let timeout = state.config.request_timeout();
    build_router()
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
}
