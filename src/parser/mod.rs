//! Catalog Parser
//!
//! Turns version-catalog text into a [`Document`] of typed values.
//! Knows nothing about validation rules.

pub mod ast;
pub mod lexer;

use thiserror::Error;

pub use ast::{Document, Entry, Section, Value};
pub use lexer::{LineKind, LogicalLine, logical_lines};

/// Structural failure; no document is produced
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty or invalid document")]
    Empty,
    #[error("unterminated table/array (opened at line {line})")]
    Unterminated { line: usize },
    #[error("malformed key-value pair at line {line}")]
    MalformedPair { line: usize },
    #[error("invalid value at line {line}")]
    InvalidValue { line: usize },
}

/// Parse catalog text into a document
///
/// This is the main entry point for parsing. Lines are first grouped into
/// logical lines (so multi-line arrays and tables arrive whole), then each
/// logical line is turned into a header or an entry.
pub fn parse(content: &str) -> Result<Document, ParseError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    if content.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let lines = lexer::logical_lines(content)?;
    ast::lines_to_document(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections_in_order() {
        let doc = parse("[versions]\nfoo = \"1.2.3\"\n\n[libraries]\nbar = { module = \"com.x:bar\", version.ref = \"foo\" }\n").unwrap();

        let names: Vec<&str> = doc.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["versions", "libraries"]);
        assert_eq!(
            doc.section("versions").unwrap().get("foo"),
            Some(&Value::Str("1.2.3".to_string()))
        );
    }

    #[test]
    fn test_parse_empty_content() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("  \n\t\n"), Err(ParseError::Empty));
    }

    #[test]
    fn test_empty_section_is_kept() {
        let doc = parse("[versions]\n[libraries]\n").unwrap();
        assert!(doc.section("versions").unwrap().is_empty());
        assert!(doc.section("libraries").is_some());
    }

    #[test]
    fn test_repeated_header_reopens_section() {
        let doc = parse("[libraries]\na = \"x.y:a\"\n[versions]\nv = \"1\"\n[libraries]\na = \"x.y:b\"\n").unwrap();

        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.section("libraries").unwrap().len(), 2);
    }

    #[test]
    fn test_root_keys_before_header() {
        let doc = parse("name = \"root\"\n[versions]\n").unwrap();
        assert_eq!(doc.sections[0].name, "");
        assert_eq!(doc.entry_count(), 1);
    }

    #[test]
    fn test_byte_order_mark_ignored() {
        let plain = "[versions]\nfoo = \"1.2.3\"\n[libraries]\nbar = { module = \"com.x:bar\", version.ref = \"foo\" }\n";
        let with_bom = format!("\u{feff}{plain}");

        assert_eq!(parse(&with_bom).unwrap(), parse(plain).unwrap());
        assert_eq!(parse("\u{feff}"), Err(ParseError::Empty));
    }

    #[test]
    fn test_line_without_equals_is_malformed() {
        let err = parse("[versions]\njust some words\n").unwrap_err();
        assert_eq!(err, ParseError::MalformedPair { line: 2 });
    }

    #[test]
    fn test_missing_key_is_malformed() {
        let err = parse("[versions]\n = \"1.0\"\n").unwrap_err();
        assert_eq!(err, ParseError::MalformedPair { line: 2 });
        assert!(err.to_string().contains("malformed key-value pair"));
    }

    #[test]
    fn test_unterminated_table_message() {
        let err = parse("[libraries]\nbar = { module = \"a.b:c\"\n").unwrap_err();
        assert!(err.to_string().contains("unterminated table/array"));
    }
}
