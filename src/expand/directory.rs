//! Address → verifier name directory.

use std::collections::HashMap;
use std::path::Path;

use color_eyre::eyre::Result;

use super::types::UNKNOWN_DVN;
use crate::config::ColumnAliases;
use crate::table::Table;
use crate::utils::normalize::{normalize_address, strip_cell_wrappers};

/// Immutable lookup from lower-cased address to verifier name.
#[derive(Debug, Clone, Default)]
pub struct VerifierDirectory {
    names: HashMap<String, String>,
}

impl VerifierDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (address, name) pairs. Later duplicates win.
    pub fn from_pairs<A, N, I>(pairs: I) -> Self
    where
        A: AsRef<str>,
        N: Into<String>,
        I: IntoIterator<Item = (A, N)>,
    {
        let names = pairs
            .into_iter()
            .map(|(addr, name)| (normalize_address(addr.as_ref()), name.into()))
            .filter(|(addr, _)| !addr.is_empty())
            .collect();
        Self { names }
    }

    /// Build from a names reference table.
    pub fn from_table(table: &Table, aliases: &ColumnAliases) -> Result<Self> {
        let addr_col = table.require_column(&aliases.directory_address)?;
        let name_col = table.require_column(&aliases.directory_name)?;

        let pairs = (0..table.len()).map(|row| {
            (
                table.cell(row, Some(addr_col)).to_string(),
                strip_cell_wrappers(table.cell(row, Some(name_col))).trim().to_string(),
            )
        });
        let directory = Self::from_pairs(pairs);
        log::info!("Verifier directory holds {} addresses", directory.len());
        Ok(directory)
    }

    /// Load a names CSV (`DVN_Address`, `DVN_Name`).
    pub fn load(path: &Path, aliases: &ColumnAliases) -> Result<Self> {
        let table = Table::load(path)?;
        Self::from_table(&table, aliases)
    }

    /// Exact lookup; the address is normalized first.
    pub fn get(&self, address: &str) -> Option<&str> {
        self.names.get(&normalize_address(address)).map(String::as_str)
    }

    /// Name for an address, falling back to `"Unknown DVN"`.
    pub fn lookup(&self, address: &str) -> &str {
        self.get(address).unwrap_or(UNKNOWN_DVN)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let directory = VerifierDirectory::from_pairs([("0xAAA", "Alpha")]);
        assert_eq!(directory.lookup("0xaaa"), "Alpha");
        assert_eq!(directory.lookup(" 0XAAA "), "Alpha");
        assert_eq!(directory.lookup("0xbbb"), UNKNOWN_DVN);
        assert_eq!(directory.get("0xbbb"), None);
    }

    #[test]
    fn test_from_table() {
        let table = Table::from_parts(
            "names",
            vec!["DVN_Address".into(), "DVN_Name".into()],
            vec![
                vec!["0xC2A0".into(), "Deutsche Telekom".into()],
                vec!["".into(), "Nobody".into()],
            ],
        );
        let directory = VerifierDirectory::from_table(&table, &ColumnAliases::default()).unwrap();
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.lookup("0xc2a0"), "Deutsche Telekom");
    }

    #[test]
    fn test_from_table_requires_columns() {
        let table = Table::from_parts("names", vec!["addr".into()], vec![]);
        assert!(VerifierDirectory::from_table(&table, &ColumnAliases::default()).is_err());
    }
}
