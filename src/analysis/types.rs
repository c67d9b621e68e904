//! Core data types for the delivery/fee reports.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::expand::Role;

/// Stack label for messages whose required verifiers have no usable names
pub const UNKNOWN_STACK: &str = "Unknown";

/// One row of the joined per-DVN table
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryRow {
    /// Normalized GUID
    pub guid: String,
    pub dvn_name: Option<String>,
    pub role: Option<Role>,
    pub fee_eth: Option<Decimal>,
    pub latency_seconds: Option<f64>,
    pub delivered: bool,
    pub source_timestamp: Option<DateTime<Utc>>,
}

/// Per-DVN fee, role and latency KPIs
#[derive(Debug, Clone, PartialEq)]
pub struct DvnKpi {
    pub dvn_name: String,
    pub unique_messages: usize,
    pub rows: usize,
    pub required_count: usize,
    pub optional_count: usize,
    pub total_fees_eth: Decimal,
    pub total_required_fees_eth: Decimal,
    pub total_optional_fees_eth: Decimal,
    pub avg_fee_required_eth: Option<Decimal>,
    pub avg_fee_optional_eth: Option<Decimal>,
    pub median_latency: Option<f64>,
    pub p95_latency: Option<f64>,
    pub avg_latency: Option<f64>,
    pub min_latency: Option<f64>,
    pub max_latency: Option<f64>,
    pub delivered_messages: usize,
    pub delivered_rate: Option<f64>,
}

/// Fee totals per (DVN, role)
#[derive(Debug, Clone, PartialEq)]
pub struct FeeSummaryRow {
    pub dvn_name: String,
    pub role: Option<Role>,
    pub rows: usize,
    pub total_fee_eth: Decimal,
    pub avg_fee_eth: Option<Decimal>,
}

/// One message with its required stack and representative latency
#[derive(Debug, Clone, PartialEq)]
pub struct StackTransaction {
    pub guid: String,
    pub stack: String,
    pub latency_seconds: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Latency cohort of one required stack
#[derive(Debug, Clone, PartialEq)]
pub struct StackSummary {
    pub stack: String,
    pub transactions: usize,
    pub median_latency: f64,
    pub avg_latency: f64,
    pub p95_latency: f64,
}

/// Stack summaries spread to their member DVNs
#[derive(Debug, Clone, PartialEq)]
pub struct DvnStackReliability {
    pub dvn_name: String,
    pub stacks_involved: usize,
    pub total_transactions: usize,
    pub avg_median_latency: f64,
    pub avg_p95_latency: f64,
}

/// Named, inclusive time range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub label: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Both bounds are inclusive.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }
}

/// Stack and DVN tables for one window
#[derive(Debug, Clone)]
pub struct WindowReport {
    pub window: TimeWindow,
    pub rows: usize,
    pub stacks: Vec<StackSummary>,
    pub dvns: Vec<DvnStackReliability>,
}

/// GUID overlap between two exports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidMatchReport {
    pub left_file: String,
    pub right_file: String,
    pub left_column: String,
    pub right_column: String,
    pub left_unique: usize,
    pub right_unique: usize,
    pub common: usize,
    pub left_join_rate: Option<f64>,
    pub right_join_rate: Option<f64>,
    pub left_only_sample: Vec<String>,
    pub right_only_sample: Vec<String>,
}

/// One operator's involvement across all messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorSummary {
    pub dvn_name: String,
    pub involved_messages: usize,
    pub required_messages: usize,
    pub required_with_latency: usize,
    pub optional_messages: usize,
    pub optional_delivered: usize,
    pub delivered_messages: usize,
    pub delivery_rate: Option<f64>,
    pub avg_delivered_latency: Option<f64>,
    /// Decimal ETH, kept as text to stay exact
    pub avg_fee_required_eth: Option<String>,
    pub avg_fee_optional_eth: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_window_bounds_are_inclusive() {
        let window = TimeWindow {
            label: "during".into(),
            start: Utc.with_ymd_and_hms(2025, 10, 19, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 10, 21, 0, 0, 0).unwrap(),
        };
        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(!window.contains(Utc.with_ymd_and_hms(2025, 10, 21, 0, 0, 1).unwrap()));
    }
}
