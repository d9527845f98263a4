//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to
//! `f64` (2 decimal places, half away from zero) for storage/serialization.

use rust_decimal::prelude::*;
use shared::models::{PaymentMethod, TaskItemInput};

const DECIMAL_PLACES: u32 = 2;

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Compare two amounts at cent precision
pub fn money_eq(a: f64, b: f64) -> bool {
    to_decimal(a).round_dp(DECIMAL_PLACES) == to_decimal(b).round_dp(DECIMAL_PLACES)
}

/// quantity × unit_price
pub fn line_total(item: &TaskItemInput) -> Decimal {
    to_decimal(item.unit_price) * Decimal::from(item.quantity)
}

/// Σ line totals
pub fn task_total(items: &[TaskItemInput]) -> f64 {
    to_f64(items.iter().map(line_total).sum())
}

/// Cash held by the driver for a set of jobs: Σ cash_received over jobs
/// paid by CASH. Every total_cash in the system goes through here.
pub fn cash_total<I>(jobs: I) -> f64
where
    I: IntoIterator<Item = (Option<PaymentMethod>, f64)>,
{
    let sum: Decimal = jobs
        .into_iter()
        .filter(|(method, _)| *method == Some(PaymentMethod::Cash))
        .map(|(_, cash)| to_decimal(cash))
        .sum();
    to_f64(sum)
}

/// Pay rates of one employee
#[derive(Debug, Clone, Copy)]
pub struct PayRates {
    pub hour_rate: f64,
    pub overtime_rate: f64,
    pub regular_hours_limit: f64,
}

/// Hours and salary of one shift
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftPay {
    pub total_hours: f64,
    pub regular_hours: f64,
    pub overtime_hours: f64,
    pub salary: f64,
}

/// Split a shift into regular and overtime hours and price it.
///
/// `None` unless `end_ms` is after `start_ms` and the span fits in an `i64`.
pub fn shift_pay(start_ms: i64, end_ms: i64, rates: PayRates) -> Option<ShiftPay> {
    let elapsed = end_ms.checked_sub(start_ms).filter(|ms| *ms > 0)?;
    let total = Decimal::from(elapsed) / Decimal::from(MILLIS_PER_HOUR);
    let limit = to_decimal(rates.regular_hours_limit).max(Decimal::ZERO);
    let regular = total.min(limit);
    let overtime = (total - limit).max(Decimal::ZERO);
    let salary = regular * to_decimal(rates.hour_rate) + overtime * to_decimal(rates.overtime_rate);

    Some(ShiftPay {
        total_hours: to_f64(total),
        regular_hours: to_f64(regular),
        overtime_hours: to_f64(overtime),
        salary: to_f64(salary),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::ItemPosition;

    const HOUR: i64 = MILLIS_PER_HOUR;

    fn rates(limit: f64) -> PayRates {
        PayRates {
            hour_rate: 10.0,
            overtime_rate: 15.0,
            regular_hours_limit: limit,
        }
    }

    fn item(quantity: i32, unit_price: f64) -> TaskItemInput {
        TaskItemInput {
            catalog_item_id: Some(1),
            description: None,
            quantity,
            position: ItemPosition::Outside,
            unit_price,
        }
    }

    #[test]
    fn test_ten_hours_splits_into_eight_plus_two() {
        let pay = shift_pay(0, 10 * HOUR, rates(8.0)).unwrap();
        assert_eq!(pay.total_hours, 10.0);
        assert_eq!(pay.regular_hours, 8.0);
        assert_eq!(pay.overtime_hours, 2.0);
        assert_eq!(pay.salary, 110.0);
    }

    #[test]
    fn test_ten_and_a_half_hours_pays_117_50() {
        // 09:00 -> 19:30
        let start = 9 * HOUR;
        let end = 19 * HOUR + HOUR / 2;
        let pay = shift_pay(start, end, rates(8.0)).unwrap();
        assert_eq!(pay.total_hours, 10.5);
        assert_eq!(pay.regular_hours, 8.0);
        assert_eq!(pay.overtime_hours, 2.5);
        assert_eq!(pay.salary, 117.5);
    }

    #[test]
    fn test_short_shift_has_no_overtime() {
        let pay = shift_pay(0, 3 * HOUR, rates(8.0)).unwrap();
        assert_eq!(pay.regular_hours, 3.0);
        assert_eq!(pay.overtime_hours, 0.0);
        assert_eq!(pay.salary, 30.0);
    }

    #[test]
    fn test_empty_or_overflowing_span_is_rejected() {
        assert!(shift_pay(5 * HOUR, 5 * HOUR, rates(8.0)).is_none());
        assert!(shift_pay(6 * HOUR, 5 * HOUR, rates(8.0)).is_none());
        assert!(shift_pay(-9_000_000_000_000_000_000, 9_000_000_000_000_000_000, rates(8.0)).is_none());
    }

    #[test]
    fn test_task_total_avoids_float_drift() {
        let items = vec![item(3, 0.1), item(1, 0.2)];
        assert_eq!(task_total(&items), 0.5);
        assert_eq!(task_total(&[item(2, 45.555)]), 91.11);
    }

    #[test]
    fn test_cash_total_counts_only_cash_jobs() {
        let jobs = vec![
            (Some(PaymentMethod::Cash), 40.0),
            (Some(PaymentMethod::Card), 99.0),
            (None, 12.0),
            (Some(PaymentMethod::Cash), 10.1),
        ];
        assert_eq!(cash_total(jobs), 50.1);
        assert_eq!(cash_total(Vec::new()), 0.0);
    }

    #[test]
    fn test_money_eq_at_cent_precision() {
        assert!(money_eq(0.1 + 0.2, 0.3));
        assert!(!money_eq(10.0, 10.01));
    }
}
