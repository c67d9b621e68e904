//! Report orchestrator.
//!
//! One function per subcommand. Each loads its input tables fully, runs
//! the expander or the aggregations, writes its outputs under the output
//! directory and prints a console summary.

use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};

use crate::analysis::report::{self, expanded_table, write_table};
use crate::analysis::{
    self, guid_match, operator, DeliveryLayout, DvnKpi, FeeSummaryRow, GuidMatchReport, OperatorSummary,
    StackSummary, WindowReport,
};
use crate::analysis::stacks::StackTimeSeries;
use crate::config::AnalysisConfig;
use crate::expand::{self, Expansion, FeeColumnLayout, VerifierDirectory};
use crate::table::{write_json, Table};

pub const MAPPED_FEES_FILE: &str = "dvnFeesMapped.csv";
pub const EXPANDED_FILE: &str = "expanded_per_dvn.csv";
pub const JOINED_FILE: &str = "expanded_per_dvn_joined.csv";
pub const EXPANDED_KPI_FILE: &str = "expanded_kpi_by_dvn.csv";
pub const KPI_FILE: &str = "kpi_by_dvn_final.csv";
pub const FEE_SUMMARY_FILE: &str = "dvn_fee_summary.csv";
pub const STACK_SUMMARY_FILE: &str = "stack_latency_summary.csv";
pub const DVN_RELIABILITY_FILE: &str = "dvn_stack_reliability.csv";
pub const TIME_SERIES_FILE: &str = "stack_time_series_top.csv";
pub const GUID_MATCH_FILE: &str = "guid_match_report.json";

/// Create the output directory if needed.
pub fn prepare_output_dir(output: &Path) -> Result<()> {
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))
}

fn load_directory(names: Option<&Path>, config: &AnalysisConfig) -> Result<VerifierDirectory> {
    match names {
        Some(path) => VerifierDirectory::load(path, &config.columns),
        None => {
            log::warn!("No verifier names file given; unmapped addresses resolve to 'Unknown DVN'");
            Ok(VerifierDirectory::new())
        }
    }
}

/// `map-names`: add precomputed name/fee mapping columns to a fees export.
pub fn run_map_names(fees: &Path, names: &Path, output: &Path, config: &AnalysisConfig) -> Result<PathBuf> {
    prepare_output_dir(output)?;
    let table = Table::load(fees)?;
    let layout = FeeColumnLayout::resolve(&table, &config.columns)?;
    let directory = VerifierDirectory::load(names, &config.columns)?;

    let mapped = expand::map_names(&table, &layout, &directory);
    let path = output.join(MAPPED_FEES_FILE);
    write_table(&path, &mapped)?;
    println!("Mapped {} rows -> {}", mapped.len(), path.display());
    Ok(path)
}

/// Everything `expand` produced.
#[derive(Debug)]
pub struct ExpandOutcome {
    pub expansion: Expansion,
    pub kpis: Vec<DvnKpi>,
    pub expanded_path: PathBuf,
    pub joined_path: Option<PathBuf>,
}

/// `expand`: one row per (message, verifier), optionally joined to deliveries.
pub fn run_expand(
    fees: &Path,
    deliveries: Option<&Path>,
    names: Option<&Path>,
    output: &Path,
    config: &AnalysisConfig,
) -> Result<ExpandOutcome> {
    prepare_output_dir(output)?;
    let table = Table::load(fees)?;
    let layout = FeeColumnLayout::resolve(&table, &config.columns)?;
    let directory = load_directory(names, config)?;

    let records = layout.records(&table);
    let expansion = expand::expand_all(&records, &directory);

    let expanded = expanded_table(&table.name, &expansion.rows);
    let expanded_path = output.join(EXPANDED_FILE);
    write_table(&expanded_path, &expanded)?;

    // KPIs run over the joined table when there is one
    let (kpi_source, joined_path) = match deliveries {
        Some(path) => {
            let deliveries = Table::load(path)?;
            let joined = analysis::left_join_on_guid(&expanded, &deliveries, &config.columns)?;
            let joined_path = output.join(JOINED_FILE);
            write_table(&joined_path, &joined)?;
            (joined, Some(joined_path))
        }
        None => (expanded, None),
    };

    let rows = analysis::load_delivery_rows(&kpi_source, &config.columns)?;
    let kpis = analysis::compute_kpis(&rows);
    report::write_kpis(&output.join(EXPANDED_KPI_FILE), &kpis)?;

    report::print_expansion_summary(&expansion, &kpis, config.reports.top_summary);
    Ok(ExpandOutcome {
        expansion,
        kpis,
        expanded_path,
        joined_path,
    })
}

/// `kpi`: combined fee/latency/role table per DVN.
pub fn run_kpi(joined: &Path, output: &Path, config: &AnalysisConfig) -> Result<Vec<DvnKpi>> {
    prepare_output_dir(output)?;
    let table = Table::load(joined)?;
    let layout = DeliveryLayout::resolve(&table, &config.columns)?;
    layout.warn_missing(&table, &["dvn_name", "role", "fee_eth", "latency", "delivered"]);

    let kpis = analysis::compute_kpis(&layout.rows(&table));
    report::write_kpis(&output.join(KPI_FILE), &kpis)?;
    report::print_kpi_table(&kpis, config.reports.top_summary);
    Ok(kpis)
}

/// `fee-summary`: fee totals per (DVN, role).
pub fn run_fee_summary(per_dvn: &Path, output: &Path, config: &AnalysisConfig) -> Result<Vec<FeeSummaryRow>> {
    prepare_output_dir(output)?;
    let table = Table::load(per_dvn)?;
    let layout = DeliveryLayout::resolve(&table, &config.columns)?;
    layout.warn_missing(&table, &["dvn_name", "role", "fee_eth"]);

    let summary = analysis::compute_fee_summary(&layout.rows(&table));
    let path = output.join(FEE_SUMMARY_FILE);
    report::write_fee_summary(&path, &summary)?;
    println!("Fee summary: {} (DVN, role) groups -> {}", summary.len(), path.display());
    Ok(summary)
}

/// `stacks`: required-stack latency cohorts and per-DVN reliability.
pub fn run_stacks(joined: &Path, output: &Path, config: &AnalysisConfig) -> Result<Vec<StackSummary>> {
    prepare_output_dir(output)?;
    let table = Table::load(joined)?;
    let layout = DeliveryLayout::resolve_for_stacks(&table, &config.columns)?;
    layout.warn_missing(&table, &["latency"]);

    let txs = analysis::stack_transactions(&layout.rows(&table));
    log::info!("Transactions with valid latency and required stack: {}", txs.len());

    let stacks = analysis::summarize_stacks(&txs);
    let dvns = analysis::dvn_reliability(&stacks);
    report::write_stack_summary(&output.join(STACK_SUMMARY_FILE), &stacks)?;
    report::write_dvn_reliability(&output.join(DVN_RELIABILITY_FILE), &dvns)?;

    report::print_stack_summary(&stacks, config.reports.top_summary);
    Ok(stacks)
}

/// `timeframe`: stack tables for the before/during/after outage windows.
pub fn run_timeframe(joined: &Path, output: &Path, config: &AnalysisConfig) -> Result<Vec<WindowReport>> {
    prepare_output_dir(output)?;
    let table = Table::load(joined)?;
    let layout = DeliveryLayout::resolve_for_stacks(&table, &config.columns)?;
    layout.warn_missing(&table, &["latency", "source_timestamp"]);

    let windows = analysis::outage_windows(&config.windows);
    let reports = analysis::analyze_windows(&layout.rows(&table), &windows);
    for r in &reports {
        report::write_stack_summary(&output.join(format!("stack_{}.csv", r.window.label)), &r.stacks)?;
        report::write_dvn_reliability(&output.join(format!("dvn_{}.csv", r.window.label)), &r.dvns)?;
    }

    report::print_window_summary(&reports);
    Ok(reports)
}

/// `stack-series`: daily median latency of the busiest stacks.
pub fn run_stack_series(
    joined: &Path,
    top: Option<usize>,
    output: &Path,
    config: &AnalysisConfig,
) -> Result<StackTimeSeries> {
    prepare_output_dir(output)?;
    let table = Table::load(joined)?;
    let layout = DeliveryLayout::resolve_for_stacks(&table, &config.columns)?;
    layout.warn_missing(&table, &["latency", "source_timestamp"]);

    let top = top.unwrap_or(config.reports.top_stacks);
    let txs = analysis::stack_transactions(&layout.rows(&table));
    let series = analysis::stack_time_series(&txs, top);

    let path = output.join(TIME_SERIES_FILE);
    report::write_time_series(&path, &series)?;
    println!(
        "Saved {} days x {} stacks -> {}",
        series.days.len(),
        series.stacks.len(),
        path.display()
    );
    Ok(series)
}

/// `guid-match`: GUID overlap between two exports.
pub fn run_guid_match(left: &Path, right: &Path, output: &Path) -> Result<GuidMatchReport> {
    prepare_output_dir(output)?;
    let left = Table::load(left)?;
    let right = Table::load(right)?;

    let report = guid_match::compare_guids(&left, &right)?;
    write_json(&output.join(GUID_MATCH_FILE), &report)?;
    report::print_guid_match(&report);
    Ok(report)
}

/// `operator`: one operator's rows and summary.
pub fn run_operator(joined: &Path, name: &str, output: &Path, config: &AnalysisConfig) -> Result<OperatorSummary> {
    prepare_output_dir(output)?;
    let table = Table::load(joined)?;
    let layout = DeliveryLayout::resolve(&table, &config.columns)?;
    layout.warn_missing(&table, &["dvn_name", "role", "fee_eth", "latency", "delivered"]);

    let rows = layout.rows(&table);
    let slug = operator::operator_slug(name);

    // Keep the operator's original rows, all columns
    let selected: Vec<Vec<String>> = rows
        .iter()
        .zip(&table.rows)
        .filter(|(row, _)| operator::is_operator_row(row, name))
        .map(|(_, raw)| raw.clone())
        .collect();
    let operator_rows = Table::from_parts(&table.name, table.headers.clone(), selected);
    write_table(&output.join(format!("operator_{}_rows.csv", slug)), &operator_rows)?;

    let summary = operator::summarize_operator(&rows, name);
    write_json(&output.join(format!("operator_{}_summary.json", slug)), &summary)?;
    report::print_operator_summary(&summary);
    Ok(summary)
}
