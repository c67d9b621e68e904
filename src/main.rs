use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use dvn_analyzer::{config_loader, orchestrator};

/// Fee, latency and verifier-stack reports for cross-chain message exports
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Optional YAML file with column aliases, outage windows and report sizes
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output directory for generated reports
    #[arg(short, long, global = true, default_value = "analysis_output")]
    output: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Number of parallel workers (0 = auto-detect)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add RequiredDVN_Mapping/OptionalDVN_Mapping columns to a fees export
    MapNames {
        /// Fees export (GUID, requiredDVNs, optionalDVNs, DVN_FEES_ARRAY)
        fees: PathBuf,
        /// Verifier names table (DVN_Address, DVN_Name)
        names: PathBuf,
    },

    /// Expand fees into one row per (message, DVN) and compute KPIs
    Expand {
        fees: PathBuf,
        /// Delivery export to left-join on GUID
        #[arg(long)]
        deliveries: Option<PathBuf>,
        /// Verifier names table (DVN_Address, DVN_Name)
        #[arg(long)]
        names: Option<PathBuf>,
    },

    /// Per-DVN fee, role and latency KPIs from a joined table
    Kpi { joined: PathBuf },

    /// Fee totals per (DVN, role)
    FeeSummary { per_dvn: PathBuf },

    /// Required-stack latency cohorts and per-DVN reliability
    Stacks { joined: PathBuf },

    /// Stack tables before, during and after the configured outage
    Timeframe { joined: PathBuf },

    /// Daily median latency of the busiest required stacks
    StackSeries {
        joined: PathBuf,
        /// Number of stacks to keep (defaults to reports.top_stacks)
        #[arg(long)]
        top: Option<usize>,
    },

    /// Check how well the GUIDs of two exports overlap
    GuidMatch { left: PathBuf, right: PathBuf },

    /// Involvement summary for one DVN operator
    Operator {
        joined: PathBuf,
        /// Operator name as it appears in DVN_NAME
        #[arg(long)]
        name: String,
    },
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(&args.log_level)).init();

    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .wrap_err("Failed to configure thread pool")?;
    }

    let config = config_loader::load_or_default(args.config.as_deref())?;
    info!("Output directory: {:?}", args.output);

    match args.command {
        Command::MapNames { fees, names } => {
            orchestrator::run_map_names(&fees, &names, &args.output, &config)?;
        }
        Command::Expand {
            fees,
            deliveries,
            names,
        } => {
            orchestrator::run_expand(
                &fees,
                deliveries.as_deref(),
                names.as_deref(),
                &args.output,
                &config,
            )?;
        }
        Command::Kpi { joined } => {
            orchestrator::run_kpi(&joined, &args.output, &config)?;
        }
        Command::FeeSummary { per_dvn } => {
            orchestrator::run_fee_summary(&per_dvn, &args.output, &config)?;
        }
        Command::Stacks { joined } => {
            orchestrator::run_stacks(&joined, &args.output, &config)?;
        }
        Command::Timeframe { joined } => {
            orchestrator::run_timeframe(&joined, &args.output, &config)?;
        }
        Command::StackSeries { joined, top } => {
            orchestrator::run_stack_series(&joined, top, &args.output, &config)?;
        }
        Command::GuidMatch { left, right } => {
            orchestrator::run_guid_match(&left, &right, &args.output)?;
        }
        Command::Operator { joined, name } => {
            orchestrator::run_operator(&joined, &name, &args.output, &config)?;
        }
    }

    info!("Done");
    Ok(())
}
