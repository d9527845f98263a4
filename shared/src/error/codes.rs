//! Unified error codes for the haulage ledger
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Task errors
//! - 5xxx: Truck errors
//! - 6xxx: Ledger (daily sheet) errors
//! - 7xxx: Payroll errors
//! - 8xxx: Employee errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Task ====================
    /// Task not found
    TaskNotFound = 4001,
    /// Task has no line items
    TaskEmpty = 4002,
    /// Task item is neither a catalog item nor described
    TaskItemInvalid = 4003,

    // ==================== 5xxx: Truck ====================
    /// Truck not found
    TruckNotFound = 5001,
    /// Task reference not present in the truck index
    TaskRefNotFound = 5002,
    /// Tipping request not found
    TippingRequestNotFound = 5003,
    /// Task is already assigned to a truck
    TaskAlreadyAssigned = 5004,

    // ==================== 6xxx: Ledger ====================
    /// Daily sheet not found
    DailySheetNotFound = 6001,

    // ==================== 7xxx: Payroll ====================
    /// Payroll record not found
    PayrollNotFound = 7001,
    /// User already has an open shift
    ShiftAlreadyOpen = 7002,
    /// User has no open shift
    NoOpenShift = 7003,
    /// Payroll record already paid
    PayrollAlreadyPaid = 7004,
    /// Shift end is not after its start
    InvalidShiftRange = 7005,
    /// Shift has not ended yet
    ShiftStillOpen = 7006,

    // ==================== 8xxx: Employee ====================
    /// Employee not found
    EmployeeNotFound = 8001,
    /// Employee has the wrong role for this operation
    EmployeeRoleMismatch = 8002,
    /// Employee is deactivated
    EmployeeInactive = 8003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
}

impl ErrorCode {
    /// Numeric value of this code
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Whether this code represents success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Stable machine-readable name, sent as `error` in failure envelopes
    pub fn name(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Unknown => "UNKNOWN",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::RequiredField => "REQUIRED_FIELD",
            Self::ValueOutOfRange => "VALUE_OUT_OF_RANGE",
            Self::TaskNotFound => "TASK_NOT_FOUND",
            Self::TaskEmpty => "TASK_EMPTY",
            Self::TaskItemInvalid => "TASK_ITEM_INVALID",
            Self::TruckNotFound => "TRUCK_NOT_FOUND",
            Self::TaskRefNotFound => "TASK_REF_NOT_FOUND",
            Self::TippingRequestNotFound => "TIPPING_REQUEST_NOT_FOUND",
            Self::TaskAlreadyAssigned => "ALREADY_ASSIGNED",
            Self::DailySheetNotFound => "DAILY_SHEET_NOT_FOUND",
            Self::PayrollNotFound => "PAYROLL_NOT_FOUND",
            Self::ShiftAlreadyOpen => "SHIFT_ALREADY_OPEN",
            Self::NoOpenShift => "NO_OPEN_SHIFT",
            Self::PayrollAlreadyPaid => "ALREADY_PAID",
            Self::InvalidShiftRange => "INVALID_SHIFT_RANGE",
            Self::ShiftStillOpen => "SHIFT_STILL_OPEN",
            Self::EmployeeNotFound => "EMPLOYEE_NOT_FOUND",
            Self::EmployeeRoleMismatch => "EMPLOYEE_ROLE_MISMATCH",
            Self::EmployeeInactive => "EMPLOYEE_INACTIVE",
            Self::InternalError => "INTERNAL_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::TimeoutError => "TIMEOUT",
        }
    }

    /// Default human-readable message
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",
            Self::InvalidFormat => "Invalid format",
            Self::RequiredField => "Required field missing",
            Self::ValueOutOfRange => "Value out of range",
            Self::TaskNotFound => "Task not found",
            Self::TaskEmpty => "Task has no items",
            Self::TaskItemInvalid => "Task item needs a catalog id or a description",
            Self::TruckNotFound => "Truck not found",
            Self::TaskRefNotFound => "Task is not assigned to this truck on that date",
            Self::TippingRequestNotFound => "Tipping request not found",
            Self::TaskAlreadyAssigned => "Task is already assigned to a truck",
            Self::DailySheetNotFound => "Daily sheet not found",
            Self::PayrollNotFound => "Payroll record not found",
            Self::ShiftAlreadyOpen => "Shift already started",
            Self::NoOpenShift => "No open shift",
            Self::PayrollAlreadyPaid => "Payroll record already paid",
            Self::InvalidShiftRange => "Shift end must be after its start",
            Self::ShiftStillOpen => "Shift has not ended",
            Self::EmployeeNotFound => "Employee not found",
            Self::EmployeeRoleMismatch => "Employee role does not allow this",
            Self::EmployeeInactive => "Employee is inactive",
            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::ConfigError => "Configuration error",
            Self::TimeoutError => "Operation timed out",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Task
            4001 => Ok(ErrorCode::TaskNotFound),
            4002 => Ok(ErrorCode::TaskEmpty),
            4003 => Ok(ErrorCode::TaskItemInvalid),

            // Truck
            5001 => Ok(ErrorCode::TruckNotFound),
            5002 => Ok(ErrorCode::TaskRefNotFound),
            5003 => Ok(ErrorCode::TippingRequestNotFound),
            5004 => Ok(ErrorCode::TaskAlreadyAssigned),

            // Ledger
            6001 => Ok(ErrorCode::DailySheetNotFound),

            // Payroll
            7001 => Ok(ErrorCode::PayrollNotFound),
            7002 => Ok(ErrorCode::ShiftAlreadyOpen),
            7003 => Ok(ErrorCode::NoOpenShift),
            7004 => Ok(ErrorCode::PayrollAlreadyPaid),
            7005 => Ok(ErrorCode::InvalidShiftRange),
            7006 => Ok(ErrorCode::ShiftStillOpen),

            // Employee
            8001 => Ok(ErrorCode::EmployeeNotFound),
            8002 => Ok(ErrorCode::EmployeeRoleMismatch),
            8003 => Ok(ErrorCode::EmployeeInactive),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9004 => Ok(ErrorCode::TimeoutError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::TaskNotFound.code(), 4001);
        assert_eq!(ErrorCode::TaskAlreadyAssigned.code(), 5004);
        assert_eq!(ErrorCode::DailySheetNotFound.code(), 6001);
        assert_eq!(ErrorCode::PayrollAlreadyPaid.code(), 7004);
        assert_eq!(ErrorCode::EmployeeNotFound.code(), 8001);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::NotFound.is_success());
    }

    #[test]
    fn test_try_from_covers_every_variant() {
        let all = [
            ErrorCode::Success,
            ErrorCode::Unknown,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::AlreadyExists,
            ErrorCode::InvalidRequest,
            ErrorCode::InvalidFormat,
            ErrorCode::RequiredField,
            ErrorCode::ValueOutOfRange,
            ErrorCode::TaskNotFound,
            ErrorCode::TaskEmpty,
            ErrorCode::TaskItemInvalid,
            ErrorCode::TruckNotFound,
            ErrorCode::TaskRefNotFound,
            ErrorCode::TippingRequestNotFound,
            ErrorCode::TaskAlreadyAssigned,
            ErrorCode::DailySheetNotFound,
            ErrorCode::PayrollNotFound,
            ErrorCode::ShiftAlreadyOpen,
            ErrorCode::NoOpenShift,
            ErrorCode::PayrollAlreadyPaid,
            ErrorCode::InvalidShiftRange,
            ErrorCode::ShiftStillOpen,
            ErrorCode::EmployeeNotFound,
            ErrorCode::EmployeeRoleMismatch,
            ErrorCode::EmployeeInactive,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
            ErrorCode::ConfigError,
            ErrorCode::TimeoutError,
        ];
        for code in all {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(9999), Err(InvalidErrorCode(9999)));
        assert_eq!(ErrorCode::try_from(1001), Err(InvalidErrorCode(1001)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::ShiftAlreadyOpen).unwrap();
        assert_eq!(json, "7002");
        let code: ErrorCode = serde_json::from_str("5004").unwrap();
        assert_eq!(code, ErrorCode::TaskAlreadyAssigned);
        assert!(serde_json::from_str::<ErrorCode>("1234").is_err());
    }

    #[test]
    fn test_display_and_name() {
        assert_eq!(format!("{}", ErrorCode::TruckNotFound), "5001");
        assert_eq!(ErrorCode::TaskAlreadyAssigned.name(), "ALREADY_ASSIGNED");
        assert_eq!(ErrorCode::PayrollAlreadyPaid.name(), "ALREADY_PAID");
        assert_eq!(
            format!("{}", InvalidErrorCode(42)),
            "invalid error code: 42"
        );
    }
}
