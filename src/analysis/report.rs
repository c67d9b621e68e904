//! Report generation: CSV tables and console summaries.

use std::path::Path;

use color_eyre::eyre::Result;
use rust_decimal::Decimal;

use super::stacks::StackTimeSeries;
use super::types::*;
use crate::expand::{ExpandedRow, Expansion, Role};
use crate::table::writer::{float_cell, opt_cell};
use crate::table::{write_csv, Table};
use crate::utils::units::format_eth;

pub const EXPANDED_HEADER: &[&str] = &[
    "GUID",
    "DVN_ADDR",
    "DVN_NAME",
    "ROLE",
    "DVN_FEE_WEI",
    "DVN_FEE_ETH",
    "DVN_FEE_IF_REQUIRED_ETH",
    "DVN_FEE_IF_OPTIONAL_ETH",
    "FEE_SOURCE",
];

pub const KPI_HEADER: &[&str] = &[
    "DVN_NAME",
    "unique_messages",
    "rows",
    "required_count",
    "optional_count",
    "total_fees_eth",
    "total_required_fees_eth",
    "total_optional_fees_eth",
    "avg_fee_required_eth",
    "avg_fee_optional_eth",
    "median_latency",
    "p95_latency",
    "avg_latency",
    "min_latency",
    "max_latency",
    "delivered_messages",
    "delivered_rate",
];

pub const FEE_SUMMARY_HEADER: &[&str] = &["DVN_NAME", "ROLE", "rows", "total_fee_eth", "avg_fee_eth"];

pub const STACK_HEADER: &[&str] = &[
    "Required_Stack",
    "transactions",
    "median_latency",
    "avg_latency",
    "p95_latency",
];

pub const DVN_STACK_HEADER: &[&str] = &[
    "DVN_NAME",
    "stacks_involved",
    "total_transactions",
    "avg_median_latency",
    "avg_p95_latency",
];

fn decimal_cell(value: Option<Decimal>) -> String {
    value.map(|d| format_eth(&d)).unwrap_or_default()
}

fn role_cell(role: Option<Role>) -> String {
    role.map(|r| r.as_str().to_string()).unwrap_or_default()
}

/// Expanded rows as a table with [`EXPANDED_HEADER`].
pub fn expanded_table(name: &str, rows: &[ExpandedRow]) -> Table {
    let cells = rows
        .iter()
        .map(|row| {
            let eth = decimal_cell(row.fee_eth);
            let (if_required, if_optional) = match row.role {
                Role::Required => (eth.clone(), String::new()),
                Role::Optional => (String::new(), eth.clone()),
            };
            vec![
                row.guid.clone(),
                opt_cell(row.verifier_address.as_deref()),
                opt_cell(row.verifier_name.as_deref()),
                row.role.as_str().to_string(),
                opt_cell(row.fee_wei),
                eth,
                if_required,
                if_optional,
                row.fee_source.to_string(),
            ]
        })
        .collect();
    Table::from_parts(name, EXPANDED_HEADER.iter().map(|h| h.to_string()).collect(), cells)
}

/// Write any in-memory table as CSV.
pub fn write_table(path: &Path, table: &Table) -> Result<usize> {
    write_csv(path, table.headers.as_slice(), table.rows.iter().cloned())
}

pub fn write_kpis(path: &Path, kpis: &[DvnKpi]) -> Result<usize> {
    let rows = kpis.iter().map(|k| {
        vec![
            k.dvn_name.clone(),
            k.unique_messages.to_string(),
            k.rows.to_string(),
            k.required_count.to_string(),
            k.optional_count.to_string(),
            format_eth(&k.total_fees_eth),
            format_eth(&k.total_required_fees_eth),
            format_eth(&k.total_optional_fees_eth),
            decimal_cell(k.avg_fee_required_eth),
            decimal_cell(k.avg_fee_optional_eth),
            float_cell(k.median_latency),
            float_cell(k.p95_latency),
            float_cell(k.avg_latency),
            float_cell(k.min_latency),
            float_cell(k.max_latency),
            k.delivered_messages.to_string(),
            float_cell(k.delivered_rate),
        ]
    });
    write_csv(path, KPI_HEADER, rows)
}

pub fn write_fee_summary(path: &Path, summary: &[FeeSummaryRow]) -> Result<usize> {
    let rows = summary.iter().map(|s| {
        vec![
            s.dvn_name.clone(),
            role_cell(s.role),
            s.rows.to_string(),
            format_eth(&s.total_fee_eth),
            decimal_cell(s.avg_fee_eth),
        ]
    });
    write_csv(path, FEE_SUMMARY_HEADER, rows)
}

pub fn write_stack_summary(path: &Path, stacks: &[StackSummary]) -> Result<usize> {
    let rows = stacks.iter().map(|s| {
        vec![
            s.stack.clone(),
            s.transactions.to_string(),
            float_cell(Some(s.median_latency)),
            float_cell(Some(s.avg_latency)),
            float_cell(Some(s.p95_latency)),
        ]
    });
    write_csv(path, STACK_HEADER, rows)
}

pub fn write_dvn_reliability(path: &Path, dvns: &[DvnStackReliability]) -> Result<usize> {
    let rows = dvns.iter().map(|d| {
        vec![
            d.dvn_name.clone(),
            d.stacks_involved.to_string(),
            d.total_transactions.to_string(),
            float_cell(Some(d.avg_median_latency)),
            float_cell(Some(d.avg_p95_latency)),
        ]
    });
    write_csv(path, DVN_STACK_HEADER, rows)
}

pub fn write_time_series(path: &Path, series: &StackTimeSeries) -> Result<usize> {
    let mut header = vec!["day".to_string()];
    header.extend(series.stacks.iter().cloned());

    let rows = series.days.iter().map(|(day, cells)| {
        let mut row = vec![day.format("%Y-%m-%d").to_string()];
        row.extend(cells.iter().map(|c| float_cell(*c)));
        row
    });
    write_csv(path, header.as_slice(), rows)
}

fn percent(rate: Option<f64>) -> String {
    rate.map(|r| format!("{:.2}%", r * 100.0))
        .unwrap_or_else(|| "n/a".to_string())
}

/// Print the expansion run summary and the top DVNs by fees.
pub fn print_expansion_summary(expansion: &Expansion, kpis: &[DvnKpi], top: usize) {
    println!("\n{}", "=".repeat(80));
    println!("DVN EXPANSION SUMMARY");
    println!("{}", "=".repeat(80));
    println!("Messages: {}", expansion.records);
    println!("Verifier rows: {}", expansion.rows.len());
    println!("Ambiguous fee alignment: {}", expansion.ambiguous_records());
    print_kpi_table(kpis, top);
}

/// Print the top rows of a KPI table.
pub fn print_kpi_table(kpis: &[DvnKpi], top: usize) {
    println!("\nTop {} DVNs by total fees:", top.min(kpis.len()));
    println!(
        "  {:<32} {:>10} {:>8} {:>24} {:>12}",
        "DVN", "messages", "rows", "total_fees_eth", "p95_latency"
    );
    for k in kpis.iter().take(top) {
        println!(
            "  {:<32} {:>10} {:>8} {:>24} {:>12}",
            k.dvn_name,
            k.unique_messages,
            k.rows,
            format_eth(&k.total_fees_eth),
            float_cell(k.p95_latency.map(|v| (v * 100.0).round() / 100.0))
        );
    }
    println!();
}

pub fn print_stack_summary(stacks: &[StackSummary], top: usize) {
    println!("\nRequired stacks ({} total):", stacks.len());
    for s in stacks.iter().take(top) {
        println!(
            "  {:>6} tx  median {:>10.2}s  p95 {:>10.2}s  {}",
            s.transactions, s.median_latency, s.p95_latency, s.stack
        );
    }
    println!();
}

pub fn print_window_summary(reports: &[WindowReport]) {
    println!("\n=== OUTAGE WINDOW COMPARISON ===\n");
    for report in reports {
        println!(
            "{}: rows={}, stacks={}, dvns={}  [{} .. {}]",
            report.window.label,
            report.rows,
            report.stacks.len(),
            report.dvns.len(),
            report.window.start.format("%Y-%m-%d %H:%M"),
            report.window.end.format("%Y-%m-%d %H:%M")
        );
    }
    println!();
}

pub fn print_guid_match(report: &GuidMatchReport) {
    println!("\n=== GUID MATCH ===\n");
    println!(
        "Detected GUID columns: {} -> {}, {} -> {}",
        report.left_file, report.left_column, report.right_file, report.right_column
    );
    println!(
        "Counts: file1 unique GUIDs = {}, file2 unique GUIDs = {}, common = {}",
        report.left_unique, report.right_unique, report.common
    );
    println!("Join rate relative to file1: {}", percent(report.left_join_rate));
    println!("Join rate relative to file2: {}", percent(report.right_join_rate));
    println!("\nOnly in file1 (up to 10): {:?}", report.left_only_sample);
    println!("Only in file2 (up to 10): {:?}", report.right_only_sample);
    println!();
}

pub fn print_operator_summary(summary: &OperatorSummary) {
    println!("\n=== {} DVN PERFORMANCE SUMMARY ===\n", summary.dvn_name.to_uppercase());
    println!("Involved messages: {}", summary.involved_messages);
    println!(
        "  Required: {} ({} with latency)",
        summary.required_messages, summary.required_with_latency
    );
    println!(
        "  Optional: {} ({} delivered)",
        summary.optional_messages, summary.optional_delivered
    );
    println!(
        "Delivered: {} ({})",
        summary.delivered_messages,
        percent(summary.delivery_rate)
    );
    if let Some(latency) = summary.avg_delivered_latency {
        println!("Average delivery latency [delivered only]: {:.2}s", latency);
    }
    println!(
        "Average fee when required: {} ETH",
        summary.avg_fee_required_eth.as_deref().unwrap_or("n/a")
    );
    println!(
        "Average fee when optional: {} ETH",
        summary.avg_fee_optional_eth.as_deref().unwrap_or("n/a")
    );
    println!();
}
