//! Single-operator involvement report.

use std::collections::HashSet;

use rust_decimal::Decimal;

use super::stats;
use super::types::{DeliveryRow, OperatorSummary};
use crate::expand::Role;
use crate::utils::units::{decimal_mean, format_eth};

/// True when the row belongs to the named operator (case-insensitive).
pub fn is_operator_row(row: &DeliveryRow, name: &str) -> bool {
    row.dvn_name
        .as_deref()
        .is_some_and(|n| n.trim().eq_ignore_ascii_case(name.trim()))
}

/// File-name friendly form of an operator name (`Deutsche Telekom` -> `deutsche_telekom`).
pub fn operator_slug(name: &str) -> String {
    let slug: Vec<String> = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    if slug.is_empty() {
        "operator".to_string()
    } else {
        slug.join("_")
    }
}

/// Summarize one operator's rows.
///
/// Message counts are unique GUIDs. Latency averages only cover delivered
/// involvement; fee averages split by the role the operator played.
pub fn summarize_operator(rows: &[DeliveryRow], name: &str) -> OperatorSummary {
    let mine: Vec<&DeliveryRow> = rows.iter().filter(|r| is_operator_row(r, name)).collect();

    let mut involved = HashSet::new();
    let mut required = HashSet::new();
    let mut required_with_latency = HashSet::new();
    let mut optional = HashSet::new();
    let mut optional_delivered = HashSet::new();
    let mut delivered = HashSet::new();
    let mut delivered_latencies = Vec::new();
    let mut required_fees: Vec<Decimal> = Vec::new();
    let mut optional_fees: Vec<Decimal> = Vec::new();

    for row in &mine {
        let guid = row.guid.as_str();
        involved.insert(guid);
        if row.delivered {
            delivered.insert(guid);
            delivered_latencies.extend(row.latency_seconds);
        }
        match row.role {
            Some(Role::Required) => {
                required.insert(guid);
                if row.latency_seconds.is_some() {
                    required_with_latency.insert(guid);
                }
                required_fees.extend(row.fee_eth);
            }
            Some(Role::Optional) => {
                optional.insert(guid);
                if row.delivered {
                    optional_delivered.insert(guid);
                }
                optional_fees.extend(row.fee_eth);
            }
            None => {}
        }
    }

    log::info!("Operator '{}' appears in {} rows", name, mine.len());
    OperatorSummary {
        dvn_name: name.to_string(),
        involved_messages: involved.len(),
        required_messages: required.len(),
        required_with_latency: required_with_latency.len(),
        optional_messages: optional.len(),
        optional_delivered: optional_delivered.len(),
        delivered_messages: delivered.len(),
        delivery_rate: (!involved.is_empty()).then(|| delivered.len() as f64 / involved.len() as f64),
        avg_delivered_latency: stats::mean(&delivered_latencies),
        avg_fee_required_eth: decimal_mean(&required_fees).map(|d| format_eth(&d)),
        avg_fee_optional_eth: decimal_mean(&optional_fees).map(|d| format_eth(&d)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(guid: &str, name: &str, role: Role, fee: i64, latency: Option<f64>, delivered: bool) -> DeliveryRow {
        DeliveryRow {
            guid: guid.to_string(),
            dvn_name: Some(name.to_string()),
            role: Some(role),
            fee_eth: Some(Decimal::new(fee, 2)),
            latency_seconds: latency,
            delivered,
            source_timestamp: None,
        }
    }

    #[test]
    fn test_slug() {
        assert_eq!(operator_slug("Deutsche Telekom"), "deutsche_telekom");
        assert_eq!(operator_slug("  LayerZero Labs (v2) "), "layerzero_labs_v2");
        assert_eq!(operator_slug("!!"), "operator");
    }

    #[test]
    fn test_summary_counts_unique_messages() {
        let rows = vec![
            row("0x1", "Deutsche Telekom", Role::Required, 10, Some(30.0), true),
            row("0x1", "Deutsche Telekom", Role::Required, 10, Some(30.0), true),
            row("0x2", "deutsche telekom", Role::Optional, 20, None, false),
            row("0x3", "Deutsche Telekom", Role::Optional, 40, Some(10.0), true),
            row("0x4", "Other", Role::Required, 99, Some(1.0), true),
        ];
        let summary = summarize_operator(&rows, "Deutsche Telekom");
        assert_eq!(summary.involved_messages, 3);
        assert_eq!(summary.required_messages, 1);
        assert_eq!(summary.required_with_latency, 1);
        assert_eq!(summary.optional_messages, 2);
        assert_eq!(summary.optional_delivered, 1);
        assert_eq!(summary.delivered_messages, 2);
        assert_eq!(summary.delivery_rate, Some(2.0 / 3.0));
        assert_eq!(summary.avg_delivered_latency, Some(70.0 / 3.0));
        assert_eq!(summary.avg_fee_required_eth.as_deref(), Some("0.1"));
        assert_eq!(summary.avg_fee_optional_eth.as_deref(), Some("0.3"));
    }

    #[test]
    fn test_absent_operator() {
        let summary = summarize_operator(&[], "Nobody");
        assert_eq!(summary.involved_messages, 0);
        assert_eq!(summary.delivery_rate, None);
        assert_eq!(summary.avg_fee_required_eth, None);
    }
}
