//! Parsers for list-valued CSV cells.
//!
//! Address and fee arrays arrive as `[ 0xa;0xb ]`, `['0xa', '0xb']` or bare
//! `0xa,0xb` text. Name/fee mappings arrive as tuple lists
//! written by an earlier mapping pass. Nothing here returns an error:
//! text that cannot be read becomes an empty list.

use std::iter::Peekable;
use std::str::Chars;
use std::sync::LazyLock;

use regex::Regex;

use super::normalize::{is_null_text, strip_cell_wrappers, strip_quotes};

/// Separator runs inside a flat list.
static LIST_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;]+").expect("Invalid list separator regex"));

/// `('Name', '123')` style pairs when the literal parse fails.
static MAPPING_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"]?([^,'"\)\(\[\]]+?)['"]?\s*[,;]\s*['"]?([0-9]+)['"]?"#)
        .expect("Invalid mapping pair regex")
});

/// Token boundaries for the last-resort pairing pass.
static MAPPING_TOKEN_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[{},;\[\]\(\)]+").expect("Invalid mapping token regex")
});

/// Parse a flat list of addresses or fee amounts.
///
/// Every token must be ASCII alphanumeric once quotes are stripped. A field
/// with any other token is treated as malformed and yields an empty list.
///
/// # Examples
/// ```
/// use dvn_analyzer::utils::list_field::parse_list_field;
///
/// assert_eq!(parse_list_field("=\"[ 0xa;0xb ]\""), vec!["0xa", "0xb"]);
/// assert_eq!(parse_list_field("['10', '20']"), vec!["10", "20"]);
/// assert!(parse_list_field("not-a-list").is_empty());
/// ```
pub fn parse_list_field(raw: &str) -> Vec<String> {
    if is_null_text(raw) {
        return Vec::new();
    }
    let text = strip_cell_wrappers(raw).trim();
    if is_null_text(text) {
        return Vec::new();
    }

    let inner = strip_brackets(text);
    let mut items = Vec::new();
    for token in LIST_SEPARATOR.split(inner) {
        let token = strip_quotes(token.trim()).trim();
        if token.is_empty() {
            continue;
        }
        if !token.chars().all(|c| c.is_ascii_alphanumeric()) {
            log::debug!("Malformed list field {:?}; treating as empty", raw);
            return Vec::new();
        }
        items.push(token.to_string());
    }
    items
}

/// Remove one pair of surrounding `[]` or `()`.
fn strip_brackets(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix('[')
        .or_else(|| text.strip_prefix('('))
        .unwrap_or(text);
    let text = text
        .strip_suffix(']')
        .or_else(|| text.strip_suffix(')'))
        .unwrap_or(text);
    text.trim()
}

/// Parse a name/fee mapping cell such as `[('Alpha', '10'), ('Beta', '20')]`.
///
/// Tries a literal parse first, then regex pair extraction, then pairs up
/// consecutive tokens.
pub fn parse_mapping_field(raw: &str) -> Vec<(String, String)> {
    if is_null_text(raw) {
        return Vec::new();
    }
    let text = strip_cell_wrappers(raw).trim();
    if is_null_text(text) {
        return Vec::new();
    }

    if let Some(pairs) = parse_literal_pairs(text) {
        return pairs;
    }
    log::debug!("Mapping field {:?} is not a literal; using pair extraction", raw);

    let pairs: Vec<(String, String)> = MAPPING_PAIR
        .captures_iter(text)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().trim();
            let fee = caps.get(2)?.as_str().trim();
            Some((name.to_string(), fee.to_string()))
        })
        .collect();
    if !pairs.is_empty() {
        return pairs;
    }

    let tokens: Vec<&str> = MAPPING_TOKEN_SEPARATOR
        .split(text)
        .map(|t| strip_quotes(t.trim()).trim())
        .filter(|t| !t.is_empty())
        .collect();
    tokens
        .chunks_exact(2)
        .map(|pair| (pair[0].to_string(), pair[1].to_string()))
        .collect()
}

/// Render pairs the way the mapping pass writes them.
///
/// # Examples
/// ```
/// use dvn_analyzer::utils::list_field::format_mapping_field;
///
/// let pairs = vec![("Alpha".to_string(), "10".to_string())];
/// assert_eq!(format_mapping_field(&pairs), "[('Alpha', '10')]");
/// ```
pub fn format_mapping_field(pairs: &[(String, String)]) -> String {
    let items: Vec<String> = pairs
        .iter()
        .map(|(name, fee)| format!("({}, {})", quote_literal(name), quote_literal(fee)))
        .collect();
    format!("[{}]", items.join(", "))
}

fn quote_literal(s: &str) -> String {
    if s.contains('\'') && !s.contains('"') {
        format!("\"{}\"", s)
    } else {
        format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}

#[derive(Debug)]
enum Literal {
    Atom(String),
    Seq(Vec<Literal>),
}

/// Parse a list or tuple of 2-sequences. `None` means "not a literal".
fn parse_literal_pairs(text: &str) -> Option<Vec<(String, String)>> {
    let mut parser = LiteralParser {
        chars: text.chars().peekable(),
    };
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.chars.peek().is_some() {
        return None;
    }

    let Literal::Seq(items) = value else {
        return None;
    };
    let pairs = items
        .into_iter()
        .filter_map(|item| match item {
            Literal::Seq(mut parts) if parts.len() >= 2 => {
                parts.truncate(2);
                let fee = parts.pop()?;
                let name = parts.pop()?;
                match (name, fee) {
                    (Literal::Atom(name), Literal::Atom(fee)) => {
                        Some((name.trim().to_string(), fee.trim().to_string()))
                    }
                    _ => None,
                }
            }
            _ => None,
        })
        .collect();
    Some(pairs)
}

struct LiteralParser<'a> {
    chars: Peekable<Chars<'a>>,
}

impl LiteralParser<'_> {
    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn parse_value(&mut self) -> Option<Literal> {
        self.skip_whitespace();
        match *self.chars.peek()? {
            '[' | '(' => self.parse_seq(),
            '\'' | '"' => self.parse_quoted().map(Literal::Atom),
            _ => self.parse_bare().map(Literal::Atom),
        }
    }

    fn parse_seq(&mut self) -> Option<Literal> {
        let close = match self.chars.next()? {
            '[' => ']',
            _ => ')',
        };
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.chars.peek() == Some(&close) {
                self.chars.next();
                break;
            }
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.chars.next()? {
                ',' => continue,
                c if c == close => break,
                _ => return None,
            }
        }
        Some(Literal::Seq(items))
    }

    fn parse_quoted(&mut self) -> Option<String> {
        let quote = self.chars.next()?;
        let mut out = String::new();
        loop {
            match self.chars.next()? {
                '\\' => out.push(self.chars.next()?),
                c if c == quote => return Some(out),
                c => out.push(c),
            }
        }
    }

    /// Numbers and `None`/`True`/`False`; bare words are not literals.
    fn parse_bare(&mut self) -> Option<String> {
        let mut out = String::new();
        while let Some(&c) = self.chars.peek() {
            if c == ',' || c == ')' || c == ']' || c.is_whitespace() {
                break;
            }
            out.push(c);
            self.chars.next();
        }
        let numeric = !out.is_empty()
            && out.chars().any(|c| c.is_ascii_digit())
            && out
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E' | '_'));
        if numeric || matches!(out.as_str(), "None" | "True" | "False") {
            Some(out)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semicolon_list_from_spreadsheet_export() {
        assert_eq!(
            parse_list_field("=\"[ 0xAAA;0xbbb ]\""),
            vec!["0xAAA".to_string(), "0xbbb".to_string()]
        );
    }

    #[test]
    fn test_tuple_and_bare_lists() {
        assert_eq!(parse_list_field("['0xa', \"0xb\"]"), vec!["0xa", "0xb"]);
        assert_eq!(parse_list_field("0xa,0xb"), vec!["0xa", "0xb"]);
        assert_eq!(parse_list_field("[10, 20, 30]"), vec!["10", "20", "30"]);
        assert_eq!(parse_list_field("0xabc"), vec!["0xabc"]);
        assert_eq!(parse_list_field("[ ]"), Vec::<String>::new());
    }

    #[test]
    fn test_null_and_malformed_lists_are_empty() {
        assert!(parse_list_field("").is_empty());
        assert!(parse_list_field("NaN").is_empty());
        assert!(parse_list_field("None").is_empty());
        assert!(parse_list_field("not-a-list").is_empty());
        assert!(parse_list_field("[('A', '1')]").is_empty());
    }

    #[test]
    fn test_mapping_literal_parse() {
        let pairs = parse_mapping_field("[('Alpha', '10'), (\"Beta\", 20)]");
        assert_eq!(
            pairs,
            vec![
                ("Alpha".to_string(), "10".to_string()),
                ("Beta".to_string(), "20".to_string())
            ]
        );
        assert!(parse_mapping_field("[]").is_empty());
    }

    #[test]
    fn test_mapping_literal_skips_non_pairs() {
        let pairs = parse_mapping_field("[('Alpha', '10'), 'loose', ('Solo',)]");
        assert_eq!(pairs, vec![("Alpha".to_string(), "10".to_string())]);
    }

    #[test]
    fn test_mapping_regex_fallback() {
        // Bare names are not literals, so the pair regex takes over.
        let pairs = parse_mapping_field("[(Alpha, 10), (Beta Net, 20)]");
        assert_eq!(
            pairs,
            vec![
                ("Alpha".to_string(), "10".to_string()),
                ("Beta Net".to_string(), "20".to_string())
            ]
        );
    }

    #[test]
    fn test_mapping_token_pairing_fallback() {
        let pairs = parse_mapping_field("{Alpha;abc}{Beta;def}");
        assert_eq!(
            pairs,
            vec![
                ("Alpha".to_string(), "abc".to_string()),
                ("Beta".to_string(), "def".to_string())
            ]
        );
    }

    #[test]
    fn test_mapping_format_round_trips_through_parser() {
        let pairs = vec![
            ("Alpha".to_string(), "10".to_string()),
            ("O'Neil Labs".to_string(), "20".to_string()),
        ];
        let text = format_mapping_field(&pairs);
        assert_eq!(text, "[('Alpha', '10'), (\"O'Neil Labs\", '20')]");
        assert_eq!(parse_mapping_field(&text), pairs);
    }
}
