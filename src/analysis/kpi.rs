//! Per-DVN fee, role and latency KPIs.

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;

use super::stats;
use super::types::{DeliveryRow, DvnKpi, FeeSummaryRow};
use crate::expand::{Role, UNKNOWN_DVN};
use crate::utils::units::decimal_mean;

#[derive(Default)]
struct KpiAccumulator<'a> {
    guids: HashSet<&'a str>,
    delivered_guids: HashSet<&'a str>,
    rows: usize,
    required_count: usize,
    optional_count: usize,
    total_fees: Decimal,
    required_fees: Vec<Decimal>,
    optional_fees: Vec<Decimal>,
    latencies: Vec<f64>,
}

fn dvn_key(row: &DeliveryRow) -> &str {
    row.dvn_name.as_deref().unwrap_or(UNKNOWN_DVN)
}

/// Aggregate rows per DVN name, sorted by total fees (descending) then name.
pub fn compute_kpis(rows: &[DeliveryRow]) -> Vec<DvnKpi> {
    let mut groups: BTreeMap<&str, KpiAccumulator> = BTreeMap::new();

    for row in rows {
        let acc = groups.entry(dvn_key(row)).or_default();
        acc.rows += 1;
        acc.guids.insert(&row.guid);
        if row.delivered {
            acc.delivered_guids.insert(&row.guid);
        }
        if let Some(latency) = row.latency_seconds {
            acc.latencies.push(latency);
        }
        if let Some(fee) = row.fee_eth {
            acc.total_fees += fee;
        }
        match row.role {
            Some(Role::Required) => {
                acc.required_count += 1;
                acc.required_fees.extend(row.fee_eth);
            }
            Some(Role::Optional) => {
                acc.optional_count += 1;
                acc.optional_fees.extend(row.fee_eth);
            }
            None => {}
        }
    }

    let mut kpis: Vec<DvnKpi> = groups
        .into_iter()
        .map(|(name, acc)| {
            let unique_messages = acc.guids.len();
            let delivered_messages = acc.delivered_guids.len();
            DvnKpi {
                dvn_name: name.to_string(),
                unique_messages,
                rows: acc.rows,
                required_count: acc.required_count,
                optional_count: acc.optional_count,
                total_fees_eth: acc.total_fees.normalize(),
                total_required_fees_eth: acc.required_fees.iter().copied().sum::<Decimal>().normalize(),
                total_optional_fees_eth: acc.optional_fees.iter().copied().sum::<Decimal>().normalize(),
                avg_fee_required_eth: decimal_mean(&acc.required_fees),
                avg_fee_optional_eth: decimal_mean(&acc.optional_fees),
                median_latency: stats::median(&acc.latencies),
                p95_latency: stats::percentile(&acc.latencies, 95.0),
                avg_latency: stats::mean(&acc.latencies),
                min_latency: stats::min(&acc.latencies),
                max_latency: stats::max(&acc.latencies),
                delivered_messages,
                delivered_rate: (unique_messages > 0)
                    .then(|| delivered_messages as f64 / unique_messages as f64),
            }
        })
        .collect();

    kpis.sort_by(|a, b| {
        b.total_fees_eth
            .cmp(&a.total_fees_eth)
            .then_with(|| a.dvn_name.cmp(&b.dvn_name))
    });
    kpis
}

/// Fee totals per (DVN, role), long format, ordered by name then role.
pub fn compute_fee_summary(rows: &[DeliveryRow]) -> Vec<FeeSummaryRow> {
    let mut groups: BTreeMap<(&str, Option<Role>), (usize, Vec<Decimal>)> = BTreeMap::new();
    for row in rows {
        let entry = groups.entry((dvn_key(row), row.role)).or_default();
        entry.0 += 1;
        entry.1.extend(row.fee_eth);
    }

    groups
        .into_iter()
        .map(|((name, role), (count, fees))| FeeSummaryRow {
            dvn_name: name.to_string(),
            role,
            rows: count,
            total_fee_eth: fees.iter().copied().sum::<Decimal>().normalize(),
            avg_fee_eth: decimal_mean(&fees),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(guid: &str, name: &str, role: Role, fee: Option<Decimal>, latency: Option<f64>, delivered: bool) -> DeliveryRow {
        DeliveryRow {
            guid: guid.to_string(),
            dvn_name: Some(name.to_string()),
            role: Some(role),
            fee_eth: fee,
            latency_seconds: latency,
            delivered,
            source_timestamp: None,
        }
    }

    #[test]
    fn test_kpis_per_dvn() {
        let rows = vec![
            row("0x1", "Alpha", Role::Required, Some(Decimal::new(1, 0)), Some(10.0), true),
            row("0x2", "Alpha", Role::Optional, Some(Decimal::new(5, 1)), Some(20.0), false),
            row("0x2", "Alpha", Role::Optional, None, None, false),
            row("0x1", "Beta", Role::Required, Some(Decimal::new(3, 0)), Some(10.0), true),
        ];
        let kpis = compute_kpis(&rows);
        assert_eq!(kpis.len(), 2);

        // Beta has the larger fee total and sorts first
        assert_eq!(kpis[0].dvn_name, "Beta");

        let alpha = &kpis[1];
        assert_eq!(alpha.unique_messages, 2);
        assert_eq!(alpha.rows, 3);
        assert_eq!(alpha.required_count, 1);
        assert_eq!(alpha.optional_count, 2);
        assert_eq!(alpha.total_fees_eth.to_string(), "1.5");
        assert_eq!(alpha.total_optional_fees_eth.to_string(), "0.5");
        assert_eq!(alpha.avg_fee_optional_eth.unwrap().to_string(), "0.5");
        assert_eq!(alpha.median_latency, Some(15.0));
        assert_eq!(alpha.min_latency, Some(10.0));
        assert_eq!(alpha.max_latency, Some(20.0));
        assert_eq!(alpha.delivered_messages, 1);
        assert_eq!(alpha.delivered_rate, Some(0.5));
    }

    #[test]
    fn test_missing_name_groups_as_unknown() {
        let mut r = row("0x1", "x", Role::Required, None, None, false);
        r.dvn_name = None;
        let kpis = compute_kpis(&[r]);
        assert_eq!(kpis[0].dvn_name, UNKNOWN_DVN);
        assert_eq!(kpis[0].avg_fee_required_eth, None);
        assert_eq!(kpis[0].median_latency, None);
    }

    #[test]
    fn test_fee_summary_long_format() {
        let rows = vec![
            row("0x1", "Alpha", Role::Optional, Some(Decimal::new(2, 0)), None, false),
            row("0x2", "Alpha", Role::Required, Some(Decimal::new(1, 0)), None, false),
            row("0x3", "Alpha", Role::Required, Some(Decimal::new(2, 0)), None, false),
        ];
        let summary = compute_fee_summary(&rows);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].role, Some(Role::Required));
        assert_eq!(summary[0].rows, 2);
        assert_eq!(summary[0].total_fee_eth.to_string(), "3");
        assert_eq!(summary[0].avg_fee_eth.unwrap().to_string(), "1.5");
        assert_eq!(summary[1].role, Some(Role::Optional));
    }
}
