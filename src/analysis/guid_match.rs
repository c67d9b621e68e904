//! GUID overlap check between two exports.

use std::collections::BTreeSet;

use color_eyre::eyre::{eyre, Result};

use super::types::GuidMatchReport;
use crate::table::Table;
use crate::utils::normalize::normalize_guid;

/// Header names tried before falling back to content sniffing
pub const GUID_COLUMN_CANDIDATES: &[&str] = &["GUID", "guid", "Guid", "guid_hex", "guidhash", "sourceguid"];

const SNIFF_ROWS: usize = 20;
const SAMPLE_SIZE: usize = 10;

/// Find the GUID column: by name first, then the first column whose
/// leading values contain `0x`.
pub fn detect_guid_column(table: &Table) -> Option<usize> {
    table.find_column(GUID_COLUMN_CANDIDATES).or_else(|| {
        (0..table.headers.len()).find(|&col| {
            table
                .rows
                .iter()
                .take(SNIFF_ROWS)
                .any(|row| row.get(col).is_some_and(|cell| cell.contains("0x")))
        })
    })
}

fn unique_guids(table: &Table, column: usize) -> BTreeSet<String> {
    (0..table.len())
        .map(|row| normalize_guid(table.cell(row, Some(column))))
        .filter(|guid| !guid.is_empty())
        .collect()
}

fn rate(common: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| common as f64 / total as f64)
}

/// Compare the normalized GUID sets of two tables.
pub fn compare_guids(left: &Table, right: &Table) -> Result<GuidMatchReport> {
    let (Some(left_col), Some(right_col)) = (detect_guid_column(left), detect_guid_column(right)) else {
        return Err(eyre!(
            "Could not detect GUID column in one of the files. Columns in {}: {:?}; columns in {}: {:?}",
            left.name,
            left.headers,
            right.name,
            right.headers
        ));
    };
    log::info!(
        "Detected GUID columns: {} -> '{}', {} -> '{}'",
        left.name,
        left.headers[left_col],
        right.name,
        right.headers[right_col]
    );

    let left_guids = unique_guids(left, left_col);
    let right_guids = unique_guids(right, right_col);
    let common = left_guids.intersection(&right_guids).count();

    Ok(GuidMatchReport {
        left_file: left.name.clone(),
        right_file: right.name.clone(),
        left_column: left.headers[left_col].clone(),
        right_column: right.headers[right_col].clone(),
        left_unique: left_guids.len(),
        right_unique: right_guids.len(),
        common,
        left_join_rate: rate(common, left_guids.len()),
        right_join_rate: rate(common, right_guids.len()),
        left_only_sample: left_guids.difference(&right_guids).take(SAMPLE_SIZE).cloned().collect(),
        right_only_sample: right_guids.difference(&left_guids).take(SAMPLE_SIZE).cloned().collect(),
    })
}
