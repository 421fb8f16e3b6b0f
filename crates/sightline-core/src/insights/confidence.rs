//! Confidence scoring

use crate::config::Thresholds;

use super::types::ConfidenceLevel;

/// Grade a finding from its change magnitude and, when known, the share of
/// the change explained by its top driver
pub fn confidence_level(
    change_pct: f64,
    driver_pct: Option<f64>,
    thresholds: &Thresholds,
) -> ConfidenceLevel {
    let magnitude = change_pct.abs();

    match driver_pct {
        Some(driver)
            if magnitude >= thresholds.high_confidence_change_pct
                && driver >= thresholds.high_confidence_driver_pct =>
        {
            ConfidenceLevel::High
        }
        _ if magnitude >= thresholds.medium_confidence_change_pct => ConfidenceLevel::Medium,
        _ => ConfidenceLevel::Low,
    }
}
