//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 4xxx: Task errors
/// - 5xxx: Truck errors
/// - 6xxx: Ledger errors
/// - 7xxx: Payroll errors
/// - 8xxx: Employee errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Task errors (4xxx)
    Task,
    /// Truck errors (5xxx)
    Truck,
    /// Ledger errors (6xxx)
    Ledger,
    /// Payroll errors (7xxx)
    Payroll,
    /// Employee errors (8xxx)
    Employee,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..4000 => Self::General,
            4000..5000 => Self::Task,
            5000..6000 => Self::Truck,
            6000..7000 => Self::Ledger,
            7000..8000 => Self::Payroll,
            8000..9000 => Self::Employee,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Task => "task",
            Self::Truck => "truck",
            Self::Ledger => "ledger",
            Self::Payroll => "payroll",
            Self::Employee => "employee",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(8), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Task);
        assert_eq!(ErrorCategory::from_code(5004), ErrorCategory::Truck);
        assert_eq!(ErrorCategory::from_code(6001), ErrorCategory::Ledger);
        assert_eq!(ErrorCategory::from_code(7002), ErrorCategory::Payroll);
        assert_eq!(ErrorCategory::from_code(8001), ErrorCategory::Employee);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::Success.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::TaskNotFound.category(), ErrorCategory::Task);
        assert_eq!(
            ErrorCode::TaskAlreadyAssigned.category(),
            ErrorCategory::Truck
        );
        assert_eq!(
            ErrorCode::DailySheetNotFound.category(),
            ErrorCategory::Ledger
        );
        assert_eq!(
            ErrorCode::PayrollAlreadyPaid.category(),
            ErrorCategory::Payroll
        );
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&ErrorCategory::Payroll).unwrap();
        assert_eq!(json, "\"payroll\"");
        let category: ErrorCategory = serde_json::from_str("\"ledger\"").unwrap();
        assert_eq!(category, ErrorCategory::Ledger);
        assert_eq!(ErrorCategory::Truck.name(), "truck");
    }
}
