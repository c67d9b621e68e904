//! Cell normalization for spreadsheet-exported values.
//!
//! Exports pass through spreadsheets that wrap values as `="..."` formulas
//! and mix address casing, so every join key goes through these helpers.

/// Strip one leading `=` and one layer of matching quotes.
///
/// # Examples
/// ```
/// use dvn_analyzer::utils::normalize::strip_cell_wrappers;
///
/// assert_eq!(strip_cell_wrappers(" =\"0xABC\" "), "0xABC");
/// assert_eq!(strip_cell_wrappers("'abc'"), "abc");
/// assert_eq!(strip_cell_wrappers("plain"), "plain");
/// ```
pub fn strip_cell_wrappers(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix('=') {
        s = rest.trim();
    }
    strip_quotes(s)
}

/// Remove one layer of surrounding single or double quotes.
pub fn strip_quotes(s: &str) -> &str {
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Normalize a message GUID into its join key.
///
/// `="0xABC"` and `'0xabc'` both become `0xabc`.
pub fn normalize_guid(raw: &str) -> String {
    strip_cell_wrappers(raw).trim().to_lowercase()
}

/// Normalize a verifier address for directory lookups.
pub fn normalize_address(raw: &str) -> String {
    strip_cell_wrappers(raw).trim().to_lowercase()
}

/// True for empty cells and null markers such as `NaN` or `None`.
pub fn is_null_text(s: &str) -> bool {
    let t = s.trim();
    t.is_empty()
        || t.eq_ignore_ascii_case("nan")
        || t.eq_ignore_ascii_case("none")
        || t.eq_ignore_ascii_case("n/a")
        || t.eq_ignore_ascii_case("na")
}

/// Parse an integer, discarding every character that is not a digit or `-`.
///
/// Returns `None` for empty results and for values that overflow `i128`.
pub fn parse_int_lossy(raw: &str) -> Option<i128> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse::<i128>().ok()
}

/// Parse a float. Plain numbers (signs and exponents included) parse as-is;
/// anything else falls back to keeping only digits and `.`.
///
/// `"N/A"`, `"None"` and other text become `None`.
pub fn parse_f64_lossy(raw: &str) -> Option<f64> {
    let strict = strip_cell_wrappers(raw).trim().parse::<f64>().ok().filter(|v| v.is_finite());
    if strict.is_some() {
        return strict;
    }

    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse `TRUE`/`FALSE` in any case.
pub fn parse_bool_lossy(raw: &str) -> Option<bool> {
    let s = strip_cell_wrappers(raw);
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
