//! Required-stack latency cohorts.
//!
//! A message's required stack is the sorted, de-duplicated set of its
//! required verifiers' names joined with `" + "`. Each message counts once
//! per stack, with the first non-null latency seen for its GUID.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;

use super::stats::{self, LatencySummary};
use super::types::*;
use crate::expand::Role;

pub const STACK_SEPARATOR: &str = " + ";

/// Required stack per GUID, for every GUID with at least one required row.
pub fn required_stacks(rows: &[DeliveryRow]) -> BTreeMap<String, String> {
    let mut members: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.role == Some(Role::Required)) {
        let names = members.entry(row.guid.as_str()).or_default();
        if let Some(name) = row.dvn_name.as_deref() {
            if !name.is_empty() && !name.eq_ignore_ascii_case("nan") {
                names.insert(name);
            }
        }
    }

    members
        .into_iter()
        .map(|(guid, names)| {
            let stack = if names.is_empty() {
                UNKNOWN_STACK.to_string()
            } else {
                names.into_iter().collect::<Vec<_>>().join(STACK_SEPARATOR)
            };
            (guid.to_string(), stack)
        })
        .collect()
}

/// Messages that have both a required stack and a numeric latency.
///
/// Ordered by first appearance of the latency row.
pub fn stack_transactions(rows: &[DeliveryRow]) -> Vec<StackTransaction> {
    let stacks = required_stacks(rows);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut txs = Vec::new();

    for row in rows {
        let Some(latency) = row.latency_seconds else {
            continue;
        };
        if !seen.insert(row.guid.as_str()) {
            continue;
        }
        if let Some(stack) = stacks.get(&row.guid) {
            txs.push(StackTransaction {
                guid: row.guid.clone(),
                stack: stack.clone(),
                latency_seconds: latency,
                timestamp: row.source_timestamp,
            });
        }
    }
    txs
}

/// Per-stack latency summary, most transactions first.
pub fn summarize_stacks(txs: &[StackTransaction]) -> Vec<StackSummary> {
    let mut by_stack: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for tx in txs {
        by_stack.entry(tx.stack.as_str()).or_default().push(tx.latency_seconds);
    }

    let mut summaries: Vec<StackSummary> = by_stack
        .into_iter()
        .filter_map(|(stack, latencies)| {
            let summary = LatencySummary::of(&latencies)?;
            Some(StackSummary {
                stack: stack.to_string(),
                transactions: summary.count,
                median_latency: summary.median,
                avg_latency: summary.mean,
                p95_latency: summary.p95,
            })
        })
        .collect();

    // Stable sort keeps ties in stack-name order
    summaries.sort_by(|a, b| b.transactions.cmp(&a.transactions));
    summaries
}

/// Spread each stack's summary to its member DVNs and average per DVN.
///
/// The `Unknown` stack has no members and is skipped.
pub fn dvn_reliability(stacks: &[StackSummary]) -> Vec<DvnStackReliability> {
    struct Acc<'a> {
        stacks: BTreeSet<&'a str>,
        transactions: usize,
        medians: Vec<f64>,
        p95s: Vec<f64>,
    }

    let mut by_dvn: BTreeMap<&str, Acc> = BTreeMap::new();
    for summary in stacks.iter().filter(|s| s.stack != UNKNOWN_STACK) {
        for name in summary.stack.split('+').map(str::trim).filter(|n| !n.is_empty()) {
            let acc = by_dvn.entry(name).or_insert_with(|| Acc {
                stacks: BTreeSet::new(),
                transactions: 0,
                medians: Vec::new(),
                p95s: Vec::new(),
            });
            acc.stacks.insert(&summary.stack);
            acc.transactions += summary.transactions;
            acc.medians.push(summary.median_latency);
            acc.p95s.push(summary.p95_latency);
        }
    }

    by_dvn
        .into_iter()
        .map(|(name, acc)| DvnStackReliability {
            dvn_name: name.to_string(),
            stacks_involved: acc.stacks.len(),
            total_transactions: acc.transactions,
            avg_median_latency: stats::mean(&acc.medians).unwrap_or_default(),
            avg_p95_latency: stats::mean(&acc.p95s).unwrap_or_default(),
        })
        .collect()
}

/// Daily median latency of the `top` busiest stacks.
#[derive(Debug, Clone, PartialEq)]
pub struct StackTimeSeries {
    /// Stack names, alphabetical
    pub stacks: Vec<String>,
    /// One entry per day, one cell per stack
    pub days: Vec<(NaiveDate, Vec<Option<f64>>)>,
}

pub fn stack_time_series(txs: &[StackTransaction], top: usize) -> StackTimeSeries {
    let top_stacks: BTreeSet<String> = summarize_stacks(txs)
        .into_iter()
        .take(top)
        .map(|s| s.stack)
        .collect();

    let mut samples: BTreeMap<NaiveDate, BTreeMap<&str, Vec<f64>>> = BTreeMap::new();
    for tx in txs.iter().filter(|tx| top_stacks.contains(&tx.stack)) {
        // Messages without a parsable timestamp have no day
        let Some(ts) = tx.timestamp else {
            continue;
        };
        samples
            .entry(ts.date_naive())
            .or_default()
            .entry(tx.stack.as_str())
            .or_default()
            .push(tx.latency_seconds);
    }

    let stacks: Vec<String> = top_stacks.into_iter().collect();
    let days = samples
        .into_iter()
        .map(|(day, per_stack)| {
            let cells = stacks
                .iter()
                .map(|stack| per_stack.get(stack.as_str()).and_then(|v| stats::median(v)))
                .collect();
            (day, cells)
        })
        .collect();

    StackTimeSeries { stacks, days }
}
