//! JSON array to spreadsheet-safe CSV.
//!
//! Values are wrapped as `="..."` formulas so spreadsheets keep long hex
//! strings and wei amounts as text. Cells are written without CSV quoting
//! so the wrappers survive as formulas.

use std::io::Write;

use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Error parsing JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Input must be a non-empty array of objects")]
    Empty,
    #[error("Error writing CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Error writing CSV: {0}")]
    Io(#[from] std::io::Error),
}

/// Text of one array element inside an `="[ a;b ]"` cell.
fn element_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Spreadsheet-safe cell for one JSON value.
///
/// # Examples
/// ```
/// use dvn_analyzer::json_export::format_cell;
/// use serde_json::json;
///
/// assert_eq!(format_cell(&json!(["0xa", 2])), "=\"[ 0xa;2 ]\"");
/// assert_eq!(format_cell(&json!(true)), "true");
/// assert_eq!(format_cell(&json!(null)), "");
/// ```
pub fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => {
            let joined: Vec<String> = items.iter().map(element_text).collect();
            format!("=\"[ {} ]\"", joined.join(";"))
        }
        Value::Object(_) => format!("=\"{}\"", value),
        Value::String(s) => format!("=\"{}\"", s),
        Value::Number(n) => format!("=\"{}\"", n),
    }
}

/// Ordered union of keys: the first object's order, then new keys as they appear.
pub fn build_headers(items: &[Value]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for obj in items.iter().filter_map(Value::as_object) {
        for key in obj.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }
    headers
}

/// A parsed document as rows: an array as-is, anything else as one row.
pub fn into_items(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

/// Convert parsed items to CSV. Returns the number of data rows written.
pub fn write_items<W: Write>(items: &[Value], out: W) -> Result<usize, ExportError> {
    if items.is_empty() {
        return Err(ExportError::Empty);
    }

    let headers = build_headers(items);
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .flexible(true)
        .from_writer(out);
    writer.write_record(&headers)?;

    let empty = Map::new();
    for (idx, item) in items.iter().enumerate() {
        let obj = item.as_object().unwrap_or_else(|| {
            log::warn!("Item {} is not an object; writing empty cells", idx);
            &empty
        });
        let row: Vec<String> = headers
            .iter()
            .map(|h| obj.get(h).map(format_cell).unwrap_or_default())
            .collect();
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(items.len())
}

/// Convert JSON text to CSV text.
pub fn json_to_csv(json: &str) -> Result<String, ExportError> {
    let items = into_items(serde_json::from_str(json)?);
    let mut buf = Vec::new();
    write_items(&items, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
