//! Time windowing around an outage.
//!
//! Splits the observation period into `before`, `during` and `after`
//! windows and recomputes the stack tables for each.

use super::stacks::{dvn_reliability, stack_transactions, summarize_stacks};
use super::types::*;
use crate::config::WindowConfig;

/// Build the before/during/after windows.
///
/// `before` = [start, outage_start - gap], `during` = [outage_start,
/// outage_end], `after` = [outage_end + gap, end]. All bounds are
/// inclusive and fall on midnight UTC.
pub fn outage_windows(config: &WindowConfig) -> Vec<TimeWindow> {
    let gap = config.gap_duration();
    let start = WindowConfig::at_midnight(config.start);
    let outage_start = WindowConfig::at_midnight(config.outage_start);
    let outage_end = WindowConfig::at_midnight(config.outage_end);
    let end = WindowConfig::at_midnight(config.end);

    vec![
        TimeWindow {
            label: "before".to_string(),
            start,
            end: outage_start - gap,
        },
        TimeWindow {
            label: "during".to_string(),
            start: outage_start,
            end: outage_end,
        },
        TimeWindow {
            label: "after".to_string(),
            start: outage_end + gap,
            end,
        },
    ]
}

/// Rows whose source timestamp falls inside the window.
///
/// Rows without a parsable timestamp belong to no window.
pub fn filter_rows_by_window(rows: &[DeliveryRow], window: &TimeWindow) -> Vec<DeliveryRow> {
    rows.iter()
        .filter(|r| r.source_timestamp.is_some_and(|ts| window.contains(ts)))
        .cloned()
        .collect()
}

/// Stack and DVN tables for every window.
pub fn analyze_windows(rows: &[DeliveryRow], windows: &[TimeWindow]) -> Vec<WindowReport> {
    windows
        .iter()
        .map(|window| {
            let in_window = filter_rows_by_window(rows, window);
            let stacks = summarize_stacks(&stack_transactions(&in_window));
            let dvns = dvn_reliability(&stacks);
            log::info!(
                "Window '{}' ({} .. {}): {} rows, {} stacks, {} DVNs",
                window.label,
                window.start,
                window.end,
                in_window.len(),
                stacks.len(),
                dvns.len()
            );
            WindowReport {
                window: window.clone(),
                rows: in_window.len(),
                stacks,
                dvns,
            }
        })
        .collect()
}
