//! Left join of expanded rows onto a delivery export by normalized GUID.

use std::collections::HashMap;

use color_eyre::eyre::Result;

use crate::config::ColumnAliases;
use crate::table::Table;
use crate::utils::normalize::normalize_guid;

/// Suffix given to delivery columns whose names collide with expanded ones
pub const DELIVERY_SUFFIX: &str = "_dt";

/// Join every left row with every delivery row sharing its GUID.
///
/// Left rows without a match are kept once with empty delivery cells.
/// Both tables must have a GUID column.
pub fn left_join_on_guid(left: &Table, deliveries: &Table, aliases: &ColumnAliases) -> Result<Table> {
    let left_guid = left.require_column(&aliases.guid)?;
    let right_guid = deliveries.require_column(&aliases.guid)?;

    let mut by_guid: HashMap<String, Vec<usize>> = HashMap::new();
    for row in 0..deliveries.len() {
        let guid = normalize_guid(deliveries.cell(row, Some(right_guid)));
        if !guid.is_empty() {
            by_guid.entry(guid).or_default().push(row);
        }
    }

    // The delivery GUID column is dropped; the left one is the key
    let right_cols: Vec<usize> = (0..deliveries.headers.len()).filter(|&c| c != right_guid).collect();
    let mut headers = left.headers.clone();
    for &col in &right_cols {
        let name = &deliveries.headers[col];
        if left.headers.iter().any(|h| h.eq_ignore_ascii_case(name)) {
            headers.push(format!("{}{}", name, DELIVERY_SUFFIX));
        } else {
            headers.push(name.clone());
        }
    }

    let mut rows = Vec::with_capacity(left.len());
    let mut matched = 0usize;
    for row in 0..left.len() {
        let base: Vec<String> = (0..left.headers.len())
            .map(|c| left.cell(row, Some(c)).to_string())
            .collect();
        let guid = normalize_guid(left.cell(row, Some(left_guid)));

        match by_guid.get(&guid) {
            Some(matches) => {
                matched += 1;
                for &drow in matches {
                    let mut joined = base.clone();
                    joined.extend(right_cols.iter().map(|&c| deliveries.cell(drow, Some(c)).to_string()));
                    rows.push(joined);
                }
            }
            None => {
                let mut joined = base;
                joined.resize(headers.len(), String::new());
                rows.push(joined);
            }
        }
    }

    log::info!(
        "Joined {} of {} rows from {} onto {}",
        matched,
        left.len(),
        left.name,
        deliveries.name
    );
    Ok(Table::from_parts(&left.name, headers, rows))
}
