//! Which expander input columns a fees table provides.
//!
//! Resolved once per table, so rows are read through fixed indices instead
//! of looking column names up again for every message.

use color_eyre::eyre::Result;

use super::types::{MappingEntry, MessageRecord};
use crate::config::ColumnAliases;
use crate::table::Table;
use crate::utils::list_field::{parse_list_field, parse_mapping_field};
use crate::utils::normalize::normalize_guid;

/// Column indices for one fees table. `None` means the column is absent
/// and the corresponding field is always empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeColumnLayout {
    pub guid: usize,
    pub required_addresses: Option<usize>,
    pub optional_addresses: Option<usize>,
    pub fees: Option<usize>,
    pub required_mapping: Option<usize>,
    pub optional_mapping: Option<usize>,
}

impl FeeColumnLayout {
    /// Resolve against a table header. Only the GUID column is mandatory.
    pub fn resolve(table: &Table, aliases: &ColumnAliases) -> Result<Self> {
        let guid = table.require_column(&aliases.guid)?;
        let layout = Self {
            guid,
            required_addresses: table.find_column_or_warn("required addresses", &aliases.required_addresses),
            optional_addresses: table.find_column_or_warn("optional addresses", &aliases.optional_addresses),
            fees: table.find_column_or_warn("fee array", &aliases.fees),
            required_mapping: table.find_column(&aliases.required_mapping),
            optional_mapping: table.find_column(&aliases.optional_mapping),
        };
        log::info!(
            "Fee columns: required={} optional={} fees={} mappings={}/{}",
            layout.required_addresses.is_some(),
            layout.optional_addresses.is_some(),
            layout.fees.is_some(),
            layout.required_mapping.is_some(),
            layout.optional_mapping.is_some()
        );
        Ok(layout)
    }

    /// True when the table carries precomputed name/fee mappings.
    pub fn has_mappings(&self) -> bool {
        self.required_mapping.is_some() || self.optional_mapping.is_some()
    }

    /// Read one row into a message record. Never fails; unreadable cells
    /// become empty lists.
    pub fn record(&self, table: &Table, row: usize) -> MessageRecord {
        let list = |col: Option<usize>| -> Vec<String> {
            col.map(|_| parse_list_field(table.cell(row, col)))
                .unwrap_or_default()
        };
        let mapping = |col: Option<usize>| -> Vec<MappingEntry> {
            col.map(|_| {
                parse_mapping_field(table.cell(row, col))
                    .into_iter()
                    .map(MappingEntry::from)
                    .collect()
            })
            .unwrap_or_default()
        };

        MessageRecord {
            guid: normalize_guid(table.cell(row, Some(self.guid))),
            required_addresses: list(self.required_addresses),
            optional_addresses: list(self.optional_addresses),
            fees_wei: list(self.fees),
            required_mapping: mapping(self.required_mapping),
            optional_mapping: mapping(self.optional_mapping),
        }
    }

    /// Read every row of the table.
    pub fn records(&self, table: &Table) -> Vec<MessageRecord> {
        (0..table.len()).map(|row| self.record(table, row)).collect()
    }
}
