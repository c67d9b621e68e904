//! Convert a JSON export into a spreadsheet-safe CSV.
//!
//! Arrays become `="[ a;b ]"` cells, scalars are wrapped as `="value"`.
//! Failures exit with status 2.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::{Context, Result};

use dvn_analyzer::json_export::{into_items, write_items};

#[derive(Parser, Debug)]
#[command(name = "json-to-csv")]
#[command(about = "Convert a JSON array of objects to spreadsheet-safe CSV")]
#[command(version)]
struct Cli {
    /// Input JSON file (array of objects, or a single object)
    input: PathBuf,

    /// Output CSV file
    output: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn run(cli: &Cli) -> Result<usize> {
    let raw = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("Error parsing JSON in {}", cli.input.display()))?;

    let file = File::create(&cli.output)
        .with_context(|| format!("Failed to create {}", cli.output.display()))?;
    let rows = write_items(&into_items(value), BufWriter::new(file))?;
    Ok(rows)
}

/// Print the outcome and map it to the process exit status.
fn exit_status(result: &Result<usize>, output: &Path) -> u8 {
    match result {
        Ok(rows) => {
            println!("Wrote {} rows to {}", rows, output.display());
            0
        }
        Err(err) => {
            eprintln!("Error: {:?}", err);
            2
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level)).init();

    let result = color_eyre::install().and_then(|()| run(&cli));
    ExitCode::from(exit_status(&result, &cli.output))
}
