//! Catalog Document Model
//!
//! Typed representation of a parsed catalog: sections of keyed values.
//! No validation logic lives here, only structure and value parsing.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::parser::ParseError;
use crate::parser::lexer::{LineKind, LogicalLine, QuoteTracker, find_unquoted};

/// Unquoted scalar tokens such as `true`, `42` or `1.2.3`
static BARE_SCALAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.+-]+$").expect("static regex"));

/// Bare keys, dotted segments allowed (`version.ref`)
static BARE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+(\.[A-Za-z0-9_-]+)*$").expect("static regex")
});

/// A typed catalog value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Quoted (or bare) scalar
    Str(String),
    /// Inline table; nested tables are flattened into dotted keys
    Table(BTreeMap<String, String>),
    /// Inline array of scalars
    Array(Vec<String>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[String]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }
}

/// A `key = value` entry with its source line
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub value: Value,
    pub line: usize,
}

/// A named section; entries keep source order, duplicates included
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Section {
    pub name: String,
    pub entries: Vec<Entry>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// First value defined for `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|entry| entry.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in source order, skipping repeated keys
    pub fn unique_entries(&self) -> impl Iterator<Item = &Entry> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter(move |entry| seen.insert(entry.key.as_str()))
    }
}

/// A parsed catalog: sections in order of first appearance
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub sections: Vec<Section>,
}

impl Document {
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name == name)
    }

    /// Total number of entries across all sections
    pub fn entry_count(&self) -> usize {
        self.sections.iter().map(Section::len).sum()
    }

    /// Get a section for writing, creating it on first use
    fn open_section(&mut self, name: &str) -> &mut Section {
        let idx = match self.sections.iter().position(|s| s.name == name) {
            Some(idx) => idx,
            None => {
                self.sections.push(Section::new(name));
                self.sections.len() - 1
            }
        };
        &mut self.sections[idx]
    }
}

/// Build a document from logical lines
///
/// Keys before the first header go into the root section `""`. A header
/// seen twice re-opens the earlier section.
pub fn lines_to_document(lines: Vec<LogicalLine>) -> Result<Document, ParseError> {
    let mut document = Document::default();
    let mut current = String::new();

    for logical in lines {
        match logical.kind {
            LineKind::Header => {
                document.open_section(&logical.text);
                current = logical.text;
            }
            LineKind::Pair => {
                let line = logical.line;
                let (raw_key, raw_value) = split_pair(&logical.text)
                    .ok_or(ParseError::MalformedPair { line })?;
                let key = parse_key(raw_key).ok_or(ParseError::MalformedPair { line })?;
                let value = parse_value(raw_value, line)?;

                document
                    .open_section(&current)
                    .entries
                    .push(Entry { key, value, line });
            }
        }
    }

    Ok(document)
}

/// Parse the right-hand side of a `key = value` pair
pub fn parse_value(text: &str, line: usize) -> Result<Value, ParseError> {
    let text = text.trim();

    if let Some(inner) = strip_delimiters(text, '{', '}') {
        return parse_table(inner, line).map(Value::Table);
    }
    if let Some(inner) = strip_delimiters(text, '[', ']') {
        return parse_array(inner, line).map(Value::Array);
    }

    parse_scalar(text).ok_or(ParseError::InvalidValue { line }).map(Value::Str)
}

fn parse_table(inner: &str, line: usize) -> Result<BTreeMap<String, String>, ParseError> {
    let mut table = BTreeMap::new();

    for part in split_top_level(inner) {
        let (raw_key, raw_value) = split_pair(part).ok_or(ParseError::MalformedPair { line })?;
        let key = parse_key(raw_key).ok_or(ParseError::MalformedPair { line })?;

        match parse_value(raw_value, line)? {
            Value::Str(value) => insert_unique(&mut table, key, value, line)?,
            Value::Table(nested) => {
                for (nested_key, value) in nested {
                    insert_unique(&mut table, format!("{key}.{nested_key}"), value, line)?;
                }
            }
            Value::Array(_) => return Err(ParseError::InvalidValue { line }),
        }
    }

    Ok(table)
}

/// Inline tables may not repeat a key, flattened keys included
fn insert_unique(
    table: &mut BTreeMap<String, String>,
    key: String,
    value: String,
    line: usize,
) -> Result<(), ParseError> {
    match table.insert(key, value) {
        Some(_) => Err(ParseError::MalformedPair { line }),
        None => Ok(()),
    }
}

fn parse_array(inner: &str, line: usize) -> Result<Vec<String>, ParseError> {
    split_top_level(inner)
        .into_iter()
        .map(|element| parse_scalar(element).ok_or(ParseError::InvalidValue { line }))
        .collect()
}

/// A quoted string with quotes removed, or a bare scalar token
fn parse_scalar(text: &str) -> Option<String> {
    let text = text.trim();
    if let Some(unquoted) = unquote(text) {
        return Some(unquoted);
    }
    BARE_SCALAR.is_match(text).then(|| text.to_string())
}

/// Keys are bare tokens or quoted strings
fn parse_key(text: &str) -> Option<String> {
    let text = text.trim();
    if let Some(unquoted) = unquote(text) {
        return (!unquoted.is_empty()).then_some(unquoted);
    }
    BARE_KEY.is_match(text).then(|| text.to_string())
}

/// Strip surrounding quotes when the whole text is exactly one string literal
fn unquote(text: &str) -> Option<String> {
    let quote = text.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    if text.len() < 2 || !text.ends_with(quote) {
        return None;
    }
    let inner = &text[1..text.len() - 1];

    if quote == '\'' {
        return (!inner.contains('\'')).then(|| inner.to_string());
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => return None,
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                other => out.push(other),
            },
            _ => out.push(ch),
        }
    }
    Some(out)
}

fn strip_delimiters(text: &str, open: char, close: char) -> Option<&str> {
    if text.len() >= 2 && text.starts_with(open) && text.ends_with(close) {
        Some(&text[1..text.len() - 1])
    } else {
        None
    }
}

/// Split on the first `=` outside string literals
fn split_pair(text: &str) -> Option<(&str, &str)> {
    let idx = find_unquoted(text, '=')?;
    Some((&text[..idx], &text[idx + 1..]))
}

/// Split on commas that are outside strings and nested brackets.
/// Empty pieces (trailing commas) are dropped.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quotes = QuoteTracker::default();
    let mut depth = 0usize;
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        if !quotes.is_code(ch) {
            continue;
        }
        match ch {
            '[' | '{' => depth += 1,
            ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string_value() {
        let value = parse_value("\"1.2.3\"", 1).unwrap();
        assert_eq!(value, Value::Str("1.2.3".to_string()));
    }

    #[test]
    fn test_parse_literal_and_bare_values() {
        assert_eq!(parse_value("'1.0'", 1).unwrap(), Value::Str("1.0".to_string()));
        assert_eq!(parse_value("true", 1).unwrap(), Value::Str("true".to_string()));
    }

    #[test]
    fn test_parse_escaped_quote() {
        let value = parse_value(r#""say \"hi\"""#, 1).unwrap();
        assert_eq!(value, Value::Str("say \"hi\"".to_string()));
    }

    #[test]
    fn test_parse_inline_table_with_dotted_key() {
        let value = parse_value(r#"{ module = "com.x:bar", version.ref = "foo" }"#, 3).unwrap();
        let table = value.as_table().unwrap();

        assert_eq!(table.get("module").map(String::as_str), Some("com.x:bar"));
        assert_eq!(table.get("version.ref").map(String::as_str), Some("foo"));
    }

    #[test]
    fn test_nested_table_is_flattened() {
        let value =
            parse_value(r#"{ id = "a.b", version = { strictly = "[1.0,2.0)" } }"#, 1).unwrap();
        let table = value.as_table().unwrap();

        assert_eq!(
            table.get("version.strictly").map(String::as_str),
            Some("[1.0,2.0)")
        );
    }

    #[test]
    fn test_repeated_table_key_rejected() {
        let err = parse_value(
            r#"{ module = "nocolon", module = "com.x:bar", version.ref = "foo" }"#,
            4,
        )
        .unwrap_err();
        assert_eq!(err, ParseError::MalformedPair { line: 4 });
    }

    #[test]
    fn test_flattened_key_collision_rejected() {
        let err =
            parse_value(r#"{ id = "a.b", version.ref = "x", version = { ref = "y" } }"#, 2)
                .unwrap_err();
        assert_eq!(err, ParseError::MalformedPair { line: 2 });
    }

    #[test]
    fn test_parse_array_with_trailing_comma() {
        let value = parse_value(r#"[ "core", "appcompat", ]"#, 1).unwrap();
        assert_eq!(
            value,
            Value::Array(vec!["core".to_string(), "appcompat".to_string()])
        );
    }

    #[test]
    fn test_commas_inside_strings_do_not_split() {
        let value = parse_value(r#"[ "a,b", "c" ]"#, 1).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_unterminated_quote_is_invalid() {
        let err = parse_value("\"1.2.3", 7).unwrap_err();
        assert_eq!(err, ParseError::InvalidValue { line: 7 });
    }

    #[test]
    fn test_nested_array_in_array_is_invalid() {
        assert!(parse_value(r#"[ ["a"] ]"#, 1).is_err());
    }

    #[test]
    fn test_table_pair_without_equals() {
        let err = parse_value(r#"{ module }"#, 2).unwrap_err();
        assert_eq!(err, ParseError::MalformedPair { line: 2 });
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key(" version.ref "), Some("version.ref".to_string()));
        assert_eq!(parse_key("\"quoted key\""), Some("quoted key".to_string()));
        assert_eq!(parse_key(""), None);
        assert_eq!(parse_key("two words"), None);
    }

    #[test]
    fn test_section_unique_entries() {
        let mut section = Section::new("libraries");
        for (key, line) in [("a", 1), ("b", 2), ("a", 3)] {
            section.entries.push(Entry {
                key: key.to_string(),
                value: Value::Str(String::new()),
                line,
            });
        }

        let lines: Vec<usize> = section.unique_entries().map(|e| e.line).collect();
        assert_eq!(lines, vec![1, 2]);
        assert_eq!(section.len(), 3);
    }
}
