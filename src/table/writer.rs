//! CSV and JSON output.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};
use serde::Serialize;

/// Write rows under a fixed header. There is never an index column.
pub fn write_csv<S, I>(path: &Path, header: &[S], rows: I) -> Result<usize>
where
    S: AsRef<str>,
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    writer
        .write_record(header.iter().map(|h| h.as_ref()))
        .with_context(|| format!("Failed to write header to {}", path.display()))?;

    let mut count = 0;
    for row in rows {
        writer
            .write_record(&row)
            .with_context(|| format!("Failed to write row to {}", path.display()))?;
        count += 1;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;

    log::info!("Wrote {} rows to {}", count, path.display());
    Ok(count)
}

/// Write a pretty-printed JSON side report.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report to JSON")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write JSON report to {}", path.display()))?;
    log::info!("JSON report written to {}", path.display());
    Ok(())
}

/// Empty cell for `None`.
pub fn opt_cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Float cell without trailing noise (`3` rather than `3.0`, empty for `None`).
pub fn float_cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
        Some(v) => format!("{}", v),
        None => String::new(),
    }
}
