//! Period-over-period comparison and anomaly detection
//!
//! Every percent change in the engine goes through [`percent_change`], which
//! owns the zero-baseline policy: a previous value of zero yields a change of
//! 0 (reported as flat) rather than an undefined value. Values are compared
//! to the cent, so a summed baseline like `0.1 + 0.2 - 0.3` is zero.

use crate::config::Thresholds;
use crate::models::PeriodValue;

use super::types::{AnomalyVerdict, Comparison, ComparisonResult, Direction, PercentChange};

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    // Adding 0.0 turns -0.0 into 0.0 so it never prints as "-0.00"
    (value * 100.0).round() / 100.0 + 0.0
}

/// `(current - previous) / previous * 100`, rounded to 2 dp
pub fn percent_change(current: f64, previous: f64) -> PercentChange {
    if round2(previous) == 0.0 {
        return PercentChange {
            value: 0.0,
            zero_baseline: true,
        };
    }

    PercentChange {
        value: round2((current - previous) / previous * 100.0),
        zero_baseline: false,
    }
}

/// Compare one period against the one before it
pub fn compare_pair(current: &PeriodValue, previous: &PeriodValue) -> ComparisonResult {
    let change = percent_change(current.value, previous.value);
    ComparisonResult {
        current_period: current.period_key.clone(),
        previous_period: previous.period_key.clone(),
        current_value: current.value,
        previous_value: previous.value,
        percent_change: change.value,
        zero_baseline: change.zero_baseline,
    }
}

/// Compare the two most recent periods of a most-recent-first series
pub fn compare_latest(values: &[PeriodValue]) -> Comparison {
    match values {
        [current, previous, ..] => Comparison::Compared(compare_pair(current, previous)),
        _ => Comparison::InsufficientData {
            available: values.len(),
        },
    }
}

/// Flag a swing whose magnitude reaches the anomaly threshold
pub fn detect_anomaly(comparison: ComparisonResult, thresholds: &Thresholds) -> AnomalyVerdict {
    let direction = if comparison.percent_change.abs() >= thresholds.anomaly_pct {
        if comparison.percent_change > 0.0 {
            Some(Direction::Increased)
        } else {
            Some(Direction::Decreased)
        }
    } else {
        None
    };

    AnomalyVerdict {
        comparison,
        direction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(key: &str, value: f64) -> PeriodValue {
        PeriodValue {
            period_key: key.to_string(),
            value,
        }
    }

    #[test]
    fn test_percent_change_basic() {
        let change = percent_change(120.0, 100.0);
        assert_eq!(change.value, 20.0);
        assert!(!change.zero_baseline);
    }

    #[test]
    fn test_percent_change_zero_previous_is_zero() {
        let change = percent_change(500.0, 0.0);
        assert_eq!(change.value, 0.0);
        assert!(change.zero_baseline);
        assert!(!change.value.is_nan());
    }

    #[test]
    fn test_percent_change_summed_zero_baseline() {
        let previous = 0.1 + 0.2 - 0.3;
        assert_ne!(previous, 0.0);

        let change = percent_change(12.5, previous);
        assert_eq!(change.value, 0.0);
        assert!(change.zero_baseline);
    }

    #[test]
    fn test_percent_change_rounds_to_two_places() {
        // 1/3 increase
        assert_eq!(percent_change(4.0, 3.0).value, 33.33);
        assert_eq!(percent_change(2.0, 3.0).value, -33.33);
    }

    #[test]
    fn test_round2_has_no_negative_zero() {
        assert_eq!(format!("{:.2}", round2(-0.0)), "0.00");
        assert_eq!(format!("{:.2}", round2(-0.001)), "0.00");
    }

    #[test]
    fn test_compare_latest_uses_first_two() {
        let values = vec![
            value("2024-03-03", 120.0),
            value("2024-03-02", 100.0),
            value("2024-03-01", 10.0),
        ];
        let Comparison::Compared(result) = compare_latest(&values) else {
            panic!("expected comparison");
        };
        assert_eq!(result.current_period, "2024-03-03");
        assert_eq!(result.previous_period, "2024-03-02");
        assert_eq!(result.percent_change, 20.0);
    }

    #[test]
    fn test_compare_latest_insufficient() {
        assert_eq!(
            compare_latest(&[value("2024-03-03", 1.0)]),
            Comparison::InsufficientData { available: 1 }
        );
        assert_eq!(
            compare_latest(&[]),
            Comparison::InsufficientData { available: 0 }
        );
    }

    #[test]
    fn test_anomaly_thresholds() {
        let thresholds = Thresholds::default();

        let up = detect_anomaly(
            compare_pair(&value("b", 110.0), &value("a", 100.0)),
            &thresholds,
        );
        assert_eq!(up.direction, Some(Direction::Increased));

        let down = detect_anomaly(
            compare_pair(&value("b", 85.0), &value("a", 100.0)),
            &thresholds,
        );
        assert_eq!(down.direction, Some(Direction::Decreased));

        let calm = detect_anomaly(
            compare_pair(&value("b", 95.0), &value("a", 100.0)),
            &thresholds,
        );
        assert!(!calm.is_anomaly());
    }

    #[test]
    fn test_anomaly_zero_baseline_is_not_flagged() {
        let verdict = detect_anomaly(
            compare_pair(&value("b", 500.0), &value("a", 0.0)),
            &Thresholds::default(),
        );
        assert!(!verdict.is_anomaly());
        assert!(verdict.comparison.zero_baseline);
    }
}
