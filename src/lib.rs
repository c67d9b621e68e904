//! # dvn-analyzer - fee and latency reports for cross-chain message exports
//!
//! This library turns CSV exports of cross-chain messages into per-verifier
//! (DVN) reports: who attested which message, in which role, for what fee,
//! and how quickly the message was delivered.
//!
//! ## Overview
//!
//! Each exported message lists its required and optional verifier addresses
//! and a flat fee array. The expander flattens that into one row per
//! (message, verifier), resolving names through a verifier directory and
//! fees through either a precomputed mapping or the positional convention
//! (required fees first, then optional). Downstream reports aggregate the
//! flattened rows, usually after a left join with a delivery export.
//!
//! ## Architecture
//!
//! - `config`: analysis configuration (column aliases, outage windows, report sizes)
//! - `config_loader`: YAML configuration loading
//! - `utils`: cell normalization, list-field parsing, wei/ETH units, timestamps
//! - `table`: CSV loading with case-insensitive column lookup, CSV/JSON output
//! - `expand`: the DVN record expander and the name/fee mapping pass
//! - `analysis`: KPIs, required-stack cohorts, outage windows, GUID checks
//! - `json_export`: JSON to spreadsheet-safe CSV conversion
//! - `orchestrator`: one entry point per report subcommand
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use dvn_analyzer::{config_loader, orchestrator};
//!
//! let config = config_loader::load_or_default(None)?;
//! let outcome = orchestrator::run_expand(
//!     Path::new("dvnFees.csv"),
//!     Some(Path::new("dt_clean.csv")),
//!     Some(Path::new("dvnNames.csv")),
//!     Path::new("analysis_output"),
//!     &config,
//! )?;
//! println!("{} verifier rows", outcome.expansion.rows.len());
//! # Ok::<(), color_eyre::eyre::Report>(())
//! ```
//!
//! ## Configuration Format
//!
//! All sections are optional:
//!
//! ```yaml
//! columns:
//!   guid: ["GUID", "guid"]
//!   latency: ["LATENCYTODELIVERY_SECONDS"]
//! windows:
//!   start: 2025-09-26
//!   outage_start: 2025-10-19
//!   outage_end: 2025-10-21
//!   end: 2025-10-25
//!   gap: 1d
//! reports:
//!   top_stacks: 6
//!   top_summary: 20
//! ```
//!
//! ## Error Handling
//!
//! Public functions return `color_eyre::eyre::Result` with file context.
//! Malformed cells never fail a run; they degrade to empty values. Missing
//! join-key columns do fail, naming the columns that were available.

pub mod config;
pub mod config_loader;
pub mod utils;
pub mod table;
pub mod expand;
pub mod analysis;
pub mod json_export;
pub mod orchestrator;
