//! Delivery, fee and latency reports over expanded per-DVN tables.
//!
//! This module provides the aggregations behind the report subcommands:
//! per-DVN KPIs, required-stack latency cohorts, outage windows, GUID
//! overlap checks and single-operator summaries.

pub mod types;
pub mod stats;
pub mod rows;
pub mod join;
pub mod kpi;
pub mod stacks;
pub mod time_window;
pub mod guid_match;
pub mod operator;
pub mod report;

pub use types::*;
pub use rows::{load_delivery_rows, DeliveryLayout};
pub use join::left_join_on_guid;
pub use kpi::{compute_fee_summary, compute_kpis};
pub use stacks::{dvn_reliability, stack_time_series, stack_transactions, summarize_stacks};
pub use time_window::{analyze_windows, outage_windows};
pub use guid_match::compare_guids;
pub use operator::summarize_operator;
