//! 统一错误处理
//!
//! 错误类型统一来自 `shared::error`，这里只补充 handler 常用的响应构造。
//!
//! ```json
//! { "code": 0, "message": "OK", "data": { ... } }
//! { "code": 5004, "message": "...", "error": "ALREADY_ASSIGNED", "details": { ... } }
//! ```

use axum::{Json, http::StatusCode};
use serde::Serialize;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// 200 成功响应
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

/// 200 成功响应 (自定义消息)
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success_with_message(message, data))
}

/// 201 创建成功响应
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message("Created", data)),
    )
}

/// Handler 返回类型: 200 + 信封
pub type ApiResult<T> = AppResult<Json<ApiResponse<T>>>;

/// Handler 返回类型: 201 + 信封
pub type CreatedResult<T> = AppResult<(StatusCode, Json<ApiResponse<T>>)>;
