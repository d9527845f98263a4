//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::TaskNotFound
            | Self::TruckNotFound
            | Self::TaskRefNotFound
            | Self::TippingRequestNotFound
            | Self::DailySheetNotFound
            | Self::PayrollNotFound
            | Self::NoOpenShift
            | Self::EmployeeNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::TaskAlreadyAssigned
            | Self::ShiftAlreadyOpen
            | Self::PayrollAlreadyPaid => StatusCode::CONFLICT,

            // 503 Service Unavailable (client can retry)
            Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown | Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (validation and business rules)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
