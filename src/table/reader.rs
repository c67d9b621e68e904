//! CSV loading and case-insensitive column lookup.

use std::path::Path;

use color_eyre::eyre::{Context, Result};

/// Table-level failures a caller can act on.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("No column matching {wanted:?} in {source_name}; available columns: {available:?}")]
    MissingColumn {
        wanted: Vec<String>,
        source_name: String,
        available: Vec<String>,
    },
}

/// A fully loaded CSV file. All cells are kept as raw strings.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Load a headered CSV file.
    ///
    /// Header names are trimmed. Every row is fitted to the header width:
    /// short rows are padded with empty cells, extra trailing cells are
    /// dropped with a warning.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

        let headers: Vec<String> = reader
            .headers()
            .with_context(|| format!("Failed to read CSV header from {}", path.display()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        let mut truncated = 0usize;
        for (line, record) in reader.records().enumerate() {
            let record = record.with_context(|| {
                format!("Failed to read row {} of {}", line + 1, path.display())
            })?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            if row.len() > headers.len() {
                if row[headers.len()..].iter().any(|c| !c.trim().is_empty()) {
                    log::warn!(
                        "Row {} of {} has {} cells for {} columns; dropping the extra cells",
                        line + 1,
                        path.display(),
                        row.len(),
                        headers.len()
                    );
                }
                truncated += 1;
            }
            row.resize(headers.len(), String::new());
            rows.push(row);
        }
        if truncated > 0 {
            log::debug!("Trimmed {} wide rows in {}", truncated, path.display());
        }

        log::info!("Loaded {} rows from {}", rows.len(), path.display());
        Ok(Self {
            name: path.display().to_string(),
            headers,
            rows,
        })
    }

    /// Build a table from in-memory parts.
    pub fn from_parts(name: &str, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.to_string(),
            headers,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first header matching any candidate, ignoring case.
    pub fn find_column<S: AsRef<str>>(&self, candidates: &[S]) -> Option<usize> {
        candidates.iter().find_map(|cand| {
            self.headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(cand.as_ref()))
        })
    }

    /// Like [`find_column`](Self::find_column) but logs a warning when absent.
    pub fn find_column_or_warn<S: AsRef<str>>(&self, label: &str, candidates: &[S]) -> Option<usize> {
        let found = self.find_column(candidates);
        if found.is_none() {
            log::warn!(
                "Could not find column for '{}' in {}; continuing without it",
                label,
                self.name
            );
        }
        found
    }

    /// Look up a column the report cannot run without.
    pub fn require_column<S: AsRef<str>>(&self, candidates: &[S]) -> Result<usize, TableError> {
        self.find_column(candidates)
            .ok_or_else(|| TableError::MissingColumn {
                wanted: candidates.iter().map(|c| c.as_ref().to_string()).collect(),
                source_name: self.name.clone(),
                available: self.headers.clone(),
            })
    }

    /// Cell text, or `""` when the column or row is short.
    pub fn cell(&self, row: usize, column: Option<usize>) -> &str {
        column
            .and_then(|c| self.rows.get(row).and_then(|r| r.get(c)))
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample() -> Table {
        Table::from_parts(
            "sample",
            vec!["GUID".into(), "requiredDVNs".into()],
            vec![vec!["0x1".into(), "[0xa]".into()]],
        )
    }

    #[test]
    fn test_find_column_ignores_case() {
        let table = sample();
        assert_eq!(table.find_column(&["guid"]), Some(0));
        assert_eq!(table.find_column(&["required_dvns", "REQUIREDDVNS"]), Some(1));
        assert_eq!(table.find_column(&["latency"]), None);
    }

    #[test]
    fn test_require_column_names_available_columns() {
        let table = sample();
        let err = table.require_column(&["SOURCETXHASH"]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("SOURCETXHASH"));
        assert!(msg.contains("requiredDVNs"));
    }

    #[test]
    fn test_load_trims_headers_and_pads_rows() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, " GUID ,DVN_FEES_ARRAY,extra\n0x1,\"[1;2]\"\n0x2,[3],x\n").unwrap();

        let table = Table::load(file.path()).unwrap();
        assert_eq!(table.headers, vec!["GUID", "DVN_FEES_ARRAY", "extra"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, Some(1)), "[1;2]");
        assert_eq!(table.cell(0, Some(2)), "");
        assert_eq!(table.cell(1, Some(2)), "x");
        assert_eq!(table.cell(1, None), "");
    }

    #[test]
    fn test_load_drops_cells_past_the_header() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "GUID,DVN_NAME\n0x1,Alpha,\n0x2,Beta,stray,cells\n0x3\n").unwrap();

        let table = Table::load(file.path()).unwrap();
        assert!(table.rows.iter().all(|row| row.len() == 2));
        assert_eq!(table.rows[0], vec!["0x1", "Alpha"]);
        assert_eq!(table.rows[1], vec!["0x2", "Beta"]);
        assert_eq!(table.rows[2], vec!["0x3", ""]);
    }
}
