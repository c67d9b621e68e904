//! Precomputed name/fee mapping columns (`map-names`).

use super::directory::VerifierDirectory;
use super::layout::FeeColumnLayout;
use crate::table::Table;
use crate::utils::list_field::format_mapping_field;

pub const REQUIRED_MAPPING_COLUMN: &str = "RequiredDVN_Mapping";
pub const OPTIONAL_MAPPING_COLUMN: &str = "OptionalDVN_Mapping";

/// Pair each address with the fee at `offset + i`.
///
/// Stops at the shorter of the address list and the remaining fees.
pub fn pair_names_with_fees(
    addresses: &[String],
    fees: &[String],
    offset: usize,
    directory: &VerifierDirectory,
) -> Vec<(String, String)> {
    addresses
        .iter()
        .zip(fees.iter().skip(offset))
        .map(|(addr, fee)| (directory.lookup(addr).to_string(), fee.clone()))
        .collect()
}

/// Copy of `table` with the two mapping columns filled in for every row.
///
/// Existing mapping columns are overwritten in place; otherwise they are
/// appended after the input columns.
pub fn map_names(table: &Table, layout: &FeeColumnLayout, directory: &VerifierDirectory) -> Table {
    let mut headers = table.headers.clone();
    let required_col = column_slot(&mut headers, REQUIRED_MAPPING_COLUMN);
    let optional_col = column_slot(&mut headers, OPTIONAL_MAPPING_COLUMN);

    let rows = (0..table.len())
        .map(|row| {
            let record = layout.record(table, row);
            let required = pair_names_with_fees(&record.required_addresses, &record.fees_wei, 0, directory);
            let optional = pair_names_with_fees(
                &record.optional_addresses,
                &record.fees_wei,
                record.required_addresses.len(),
                directory,
            );

            let mut cells = table.rows[row].clone();
            cells.resize(headers.len(), String::new());
            cells[required_col] = format_mapping_field(&required);
            cells[optional_col] = format_mapping_field(&optional);
            cells
        })
        .collect();

    Table::from_parts(&table.name, headers, rows)
}

fn column_slot(headers: &mut Vec<String>, name: &str) -> usize {
    match headers.iter().position(|h| h.eq_ignore_ascii_case(name)) {
        Some(idx) => idx,
        None => {
            headers.push(name.to_string());
            headers.len() - 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnAliases;
    use crate::utils::list_field::parse_mapping_field;

    fn directory() -> VerifierDirectory {
        VerifierDirectory::from_pairs([("0xaaa", "Alpha"), ("0xbbb", "Beta"), ("0xccc", "Gamma")])
    }

    #[test]
    fn test_pairing_stops_at_shorter_side() {
        let addrs = vec!["0xaaa".to_string(), "0xbbb".to_string()];
        let fees = vec!["10".to_string()];
        let pairs = pair_names_with_fees(&addrs, &fees, 0, &directory());
        assert_eq!(pairs, vec![("Alpha".to_string(), "10".to_string())]);
    }

    #[test]
    fn test_map_names_uses_optional_offset() {
        let table = Table::from_parts(
            "fees",
            vec![
                "GUID".into(),
                "requiredDVNs".into(),
                "optionalDVNs".into(),
                "DVN_FEES_ARRAY".into(),
            ],
            vec![vec![
                "0x1".into(),
                "[0xaaa;0xbbb]".into(),
                "[0xccc]".into(),
                "[10;20;30]".into(),
            ]],
        );
        let layout = FeeColumnLayout::resolve(&table, &ColumnAliases::default()).unwrap();
        let mapped = map_names(&table, &layout, &directory());

        assert_eq!(mapped.headers.len(), 6);
        assert_eq!(mapped.headers[4], REQUIRED_MAPPING_COLUMN);
        assert_eq!(mapped.rows[0][4], "[('Alpha', '10'), ('Beta', '20')]");

        let optional = parse_mapping_field(&mapped.rows[0][5]);
        assert_eq!(optional, vec![("Gamma".to_string(), "30".to_string())]);
    }

    #[test]
    fn test_existing_mapping_column_is_overwritten() {
        let table = Table::from_parts(
            "fees",
            vec!["GUID".into(), "requiredDVNs".into(), "RequiredDVN_Mapping".into()],
            vec![vec!["0x1".into(), "[0xaaa]".into(), "stale".into()]],
        );
        let layout = FeeColumnLayout::resolve(&table, &ColumnAliases::default()).unwrap();
        let mapped = map_names(&table, &layout, &directory());
        assert_eq!(mapped.headers.len(), 4);
        assert_eq!(mapped.rows[0][2], "[]");
        assert_eq!(mapped.rows[0][3], "[]");
    }
}
