//! Reading joined per-DVN tables into [`DeliveryRow`]s.

use std::str::FromStr;

use color_eyre::eyre::Result;
use rust_decimal::Decimal;

use super::types::DeliveryRow;
use crate::config::ColumnAliases;
use crate::expand::Role;
use crate::table::Table;
use crate::utils::normalize::{is_null_text, normalize_guid, parse_bool_lossy, parse_f64_lossy, strip_cell_wrappers};
use crate::utils::timestamp::parse_timestamp;

/// Column indices of a joined per-DVN table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryLayout {
    pub guid: usize,
    pub dvn_name: Option<usize>,
    pub role: Option<usize>,
    pub fee_eth: Option<usize>,
    pub latency: Option<usize>,
    pub delivered: Option<usize>,
    pub message_status: Option<usize>,
    pub source_timestamp: Option<usize>,
}

impl DeliveryLayout {
    /// Resolve against a header. The GUID column is the only hard requirement.
    pub fn resolve(table: &Table, aliases: &ColumnAliases) -> Result<Self> {
        let layout = Self {
            guid: table.require_column(&aliases.guid)?,
            dvn_name: table.find_column(&aliases.dvn_name),
            role: table.find_column(&aliases.role),
            fee_eth: table.find_column(&aliases.fee_eth),
            latency: table.find_column(&aliases.latency),
            delivered: table.find_column(&aliases.delivered),
            message_status: table.find_column(&aliases.message_status),
            source_timestamp: table.find_column(&aliases.source_timestamp),
        };
        log::debug!("Delivery layout for {}: {:?}", table.name, layout);
        Ok(layout)
    }

    /// Resolve for the stack reports, which cannot run without names and roles.
    pub fn resolve_for_stacks(table: &Table, aliases: &ColumnAliases) -> Result<Self> {
        let mut layout = Self::resolve(table, aliases)?;
        layout.role = Some(table.require_column(&aliases.role)?);
        layout.dvn_name = Some(table.require_column(&aliases.dvn_name)?);
        Ok(layout)
    }

    /// Warn once for each column a report needs but the table lacks.
    pub fn warn_missing(&self, table: &Table, wanted: &[&str]) {
        for &label in wanted {
            let present = match label {
                "dvn_name" => self.dvn_name.is_some(),
                "role" => self.role.is_some(),
                "fee_eth" => self.fee_eth.is_some(),
                "latency" => self.latency.is_some(),
                "delivered" => self.delivered.is_some() || self.message_status.is_some(),
                "source_timestamp" => self.source_timestamp.is_some(),
                _ => true,
            };
            if !present {
                log::warn!(
                    "Could not find column for '{}' in {}; continuing without it",
                    label,
                    table.name
                );
            }
        }
    }

    pub fn row(&self, table: &Table, row: usize) -> DeliveryRow {
        let name = strip_cell_wrappers(table.cell(row, self.dvn_name)).trim();
        let delivered = parse_bool_lossy(table.cell(row, self.delivered)).unwrap_or_else(|| {
            strip_cell_wrappers(table.cell(row, self.message_status)).eq_ignore_ascii_case("DELIVERED")
        });

        DeliveryRow {
            guid: normalize_guid(table.cell(row, Some(self.guid))),
            dvn_name: (!is_null_text(name)).then(|| name.to_string()),
            role: Role::parse(strip_cell_wrappers(table.cell(row, self.role))),
            fee_eth: parse_decimal(table.cell(row, self.fee_eth)),
            latency_seconds: parse_f64_lossy(table.cell(row, self.latency)),
            delivered,
            source_timestamp: parse_timestamp(table.cell(row, self.source_timestamp)),
        }
    }

    pub fn rows(&self, table: &Table) -> Vec<DeliveryRow> {
        (0..table.len()).map(|row| self.row(table, row)).collect()
    }
}

/// Exact decimal from a cell; scientific notation is accepted.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let s = strip_cell_wrappers(raw).trim();
    if is_null_text(s) {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
        .map(|d| d.normalize())
}

/// Load a joined table and read every row.
pub fn load_delivery_rows(table: &Table, aliases: &ColumnAliases) -> Result<Vec<DeliveryRow>> {
    let layout = DeliveryLayout::resolve(table, aliases)?;
    Ok(layout.rows(table))
}
