//! Driver attribution across a categorical dimension

use crate::config::Thresholds;
use crate::models::RegionChangeRow;

use super::compare::round2;
use super::types::{AttributionResult, DriverContribution};

/// Decompose the total change into per-value contributions
///
/// Rows are scanned in input order and the first value with the largest
/// absolute contribution is kept on ties. The total is kept to the cent, so
/// changes that cancel out leave no float residue and no contributions are
/// computed.
pub fn attribute_drivers(rows: &[RegionChangeRow], thresholds: &Thresholds) -> AttributionResult {
    let changes: Vec<(&str, f64)> = rows
        .iter()
        .map(|r| (r.label.as_str(), r.current_value - r.previous_value))
        .collect();
    let total_change = round2(changes.iter().map(|(_, change)| change).sum());

    if total_change == 0.0 {
        return AttributionResult {
            contributions: Vec::new(),
            primary_driver: None,
            total_change,
            max_contribution: 0.0,
        };
    }

    let mut contributions = Vec::with_capacity(changes.len());
    let mut leader: Option<&str> = None;
    let mut max_contribution = 0.0;

    for (label, change) in changes {
        let contribution_pct = round2(change / total_change * 100.0);

        if contribution_pct.abs() > max_contribution {
            max_contribution = contribution_pct.abs();
            leader = Some(label);
        }

        contributions.push(DriverContribution {
            label: label.to_string(),
            change,
            contribution_pct,
        });
    }

    let primary_driver = if max_contribution >= thresholds.primary_driver_pct {
        leader.map(str::to_string)
    } else {
        None
    };

    AttributionResult {
        contributions,
        primary_driver,
        total_change,
        max_contribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: &str, current: f64, previous: f64) -> RegionChangeRow {
        RegionChangeRow {
            label: label.to_string(),
            current_value: current,
            previous_value: previous,
        }
    }

    #[test]
    fn test_no_overall_change() {
        let rows = vec![row("East", 150.0, 100.0), row("West", 50.0, 100.0)];
        let result = attribute_drivers(&rows, &Thresholds::default());

        assert!(!result.has_change());
        assert!(result.contributions.is_empty());
        assert!(result.primary_driver.is_none());
    }

    #[test]
    fn test_changes_cancelling_in_cents() {
        // +0.10, +0.20 and -0.30 sum to a tiny negative residue in f64
        let rows = vec![
            row("A", 10.10, 10.00),
            row("B", 20.20, 20.00),
            row("C", 29.70, 30.00),
        ];
        let result = attribute_drivers(&rows, &Thresholds::default());

        assert_eq!(result.total_change, 0.0);
        assert!(!result.has_change());
        assert!(result.contributions.is_empty());
        assert!(result.primary_driver.is_none());
        assert_eq!(result.max_contribution, 0.0);
    }

    #[test]
    fn test_cent_changes_attribute_cleanly() {
        let rows = vec![row("A", 10.30, 10.00), row("B", 20.10, 20.00)];
        let result = attribute_drivers(&rows, &Thresholds::default());

        assert_eq!(result.total_change, 0.4);
        assert_eq!(result.contributions[0].contribution_pct, 75.0);
        assert_eq!(result.contributions[1].contribution_pct, 25.0);
        assert_eq!(result.primary_driver.as_deref(), Some("A"));
    }

    #[test]
    fn test_dominant_driver() {
        let rows = vec![row("A", 180.0, 100.0), row("B", 120.0, 100.0)];
        let result = attribute_drivers(&rows, &Thresholds::default());

        assert_eq!(result.total_change, 100.0);
        assert_eq!(result.contributions[0].contribution_pct, 80.0);
        assert_eq!(result.contributions[1].contribution_pct, 20.0);
        assert_eq!(result.primary_driver.as_deref(), Some("A"));
    }

    #[test]
    fn test_no_single_driver() {
        let rows = vec![
            row("A", 140.0, 100.0),
            row("B", 140.0, 100.0),
            row("C", 120.0, 100.0),
        ];
        let result = attribute_drivers(&rows, &Thresholds::default());

        assert_eq!(result.max_contribution, 40.0);
        assert!(result.primary_driver.is_none());
        assert_eq!(result.contributions.len(), 3);
    }

    #[test]
    fn test_tie_keeps_first_encountered() {
        // total = 10: North +700%, South -700%, East +100%
        let rows = vec![
            row("North", 170.0, 100.0),
            row("South", 30.0, 100.0),
            row("East", 110.0, 100.0),
        ];
        let result = attribute_drivers(&rows, &Thresholds::default());

        assert_eq!(result.max_contribution, 700.0);
        assert_eq!(result.primary_driver.as_deref(), Some("North"));
    }

    #[test]
    fn test_negative_contribution_can_drive() {
        // Overall drop dominated by West
        let rows = vec![row("East", 110.0, 100.0), row("West", 40.0, 100.0)];
        let result = attribute_drivers(&rows, &Thresholds::default());

        assert_eq!(result.total_change, -50.0);
        assert_eq!(result.contributions[0].contribution_pct, -20.0);
        assert_eq!(result.contributions[1].contribution_pct, 120.0);
        assert_eq!(result.primary_driver.as_deref(), Some("West"));
    }

    #[test]
    fn test_exactly_at_threshold_is_driver() {
        let rows = vec![row("A", 160.0, 100.0), row("B", 140.0, 100.0)];
        let result = attribute_drivers(&rows, &Thresholds::default());
        assert_eq!(result.max_contribution, 60.0);
        assert_eq!(result.primary_driver.as_deref(), Some("A"));
    }
}
