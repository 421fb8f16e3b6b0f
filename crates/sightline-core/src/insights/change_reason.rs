//! Change-reason analysis
//!
//! Splits a revenue change into its two factors, order count and average
//! order value, and names the cause from an ordered decision table.

use crate::config::Thresholds;
use crate::models::PeriodRow;

use super::compare::percent_change;
use super::types::{ChangeCause, ChangeReason};

/// Percent changes of both factors, plus whether either hit a zero baseline
pub fn analyze_change_reason(
    current: &PeriodRow,
    previous: &PeriodRow,
    thresholds: &Thresholds,
) -> (ChangeReason, bool) {
    let orders = percent_change(current.order_count, previous.order_count);
    let aov = percent_change(current.average_order_value, previous.average_order_value);

    let reason = ChangeReason {
        orders_change_pct: orders.value,
        aov_change_pct: aov.value,
        cause: attribute_cause(orders.value, aov.value, thresholds.change_reason_band_pct),
    };

    (reason, orders.zero_baseline || aov.zero_baseline)
}

/// First matching row of the decision table wins
pub fn attribute_cause(orders_pct: f64, aov_pct: f64, band: f64) -> ChangeCause {
    let orders_down = orders_pct < -band;
    let aov_down = aov_pct < -band;
    let orders_flat = orders_pct.abs() <= band;
    let aov_flat = aov_pct.abs() <= band;

    if orders_down && aov_flat {
        ChangeCause::FewerOrders
    } else if orders_flat && aov_down {
        ChangeCause::LowerOrderValue
    } else if orders_down && aov_down {
        ChangeCause::BothDeclined
    } else if orders_pct > band && aov_pct > band {
        ChangeCause::BothImproved
    } else {
        ChangeCause::MixedSignals
    }
}
