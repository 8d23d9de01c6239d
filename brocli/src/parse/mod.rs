//! Parsers turning switch CLI output into typed records.
//!
//! Every table parser works the same way: split the output into lines,
//! drop a fixed number of header and trailer lines (a per-command constant
//! from the platform's [`TableLayout`], never inferred), then tokenize each
//! remaining row on whitespace. A row whose token count is not one the
//! layout recognizes fails the whole table with
//! [`ParseError::UnexpectedShape`]: a truncated row is a stronger sign that
//! the CLI format changed than of a transient glitch.
//!
//! # Blank lines
//!
//! Older NOS drivers stopped reading a table at the first empty line. That
//! behaviour is kept as [`BlankLines::Truncate`] so results match what
//! existing tooling sees, but it silently drops any rows after a stray blank
//! line. Layouts can opt into [`BlankLines::Skip`] instead; the VLAN table
//! does, since its output separates entries with blank lines.

mod arp;
mod counters;
mod environment;
mod facts;
mod interfaces;
mod mac_table;
mod vlan;

pub use arp::{ArpEntry, parse_arp_table};
pub use counters::{InterfaceCounters, parse_interface_counters};
pub use environment::{
    Environment, FanStatus, PowerStatus, TemperatureStatus, UNSUPPORTED_SENSOR, parse_cpu_load,
    parse_fans, parse_power, parse_temperature,
};
pub use facts::{FactProbes, Facts, VENDOR, parse_facts};
pub(crate) use environment::or_unsupported;
pub use interfaces::{Interface, parse_interfaces};
pub use mac_table::{MacEntry, parse_mac_table};
pub use vlan::{Vlan, parse_vlan_table};

use std::fmt;
use std::str::FromStr;

use log::{debug, warn};

use crate::error::ParseError;

/// What to do with an empty line inside the data window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankLines {
    /// Stop reading at a zero-length line; rows after it are dropped. A line
    /// of spaces is not blank and is read as a row.
    Truncate,
    /// Ignore empty and whitespace-only lines and keep reading.
    Skip,
}

/// Token counts a well-formed row may have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCount {
    /// Exactly one of these counts.
    OneOf(Vec<usize>),
    /// At least this many tokens.
    AtLeast(usize),
    /// No shape check (line-oriented output).
    Any,
}

impl TokenCount {
    /// Whether a row with `count` tokens is well-formed.
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            TokenCount::OneOf(counts) => counts.contains(&count),
            TokenCount::AtLeast(min) => count >= *min,
            TokenCount::Any => true,
        }
    }
}

impl fmt::Display for TokenCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenCount::OneOf(counts) => {
                let counts: Vec<String> = counts.iter().map(|c| c.to_string()).collect();
                write!(f, "{}", counts.join(" or "))
            }
            TokenCount::AtLeast(min) => write!(f, "at least {min}"),
            TokenCount::Any => write!(f, "any number of"),
        }
    }
}

/// How one command's output is laid out.
#[derive(Debug, Clone)]
pub struct TableLayout {
    /// CLI command producing the table.
    pub command: String,

    /// Leading lines to discard (column titles, `====` rules).
    pub header_lines: usize,

    /// Trailing lines to discard.
    pub trailer_lines: usize,

    /// Recognized row shapes.
    pub tokens: TokenCount,

    /// Blank line policy.
    pub blank_lines: BlankLines,

    /// Rows starting with whitespace continue the previous row and are ignored.
    pub indented_continuations: bool,
}

impl TableLayout {
    /// Create a layout with truncating blank-line handling.
    pub fn new(
        command: impl Into<String>,
        header_lines: usize,
        trailer_lines: usize,
        tokens: TokenCount,
    ) -> Self {
        Self {
            command: command.into(),
            header_lines,
            trailer_lines,
            tokens,
            blank_lines: BlankLines::Truncate,
            indented_continuations: false,
        }
    }

    /// Set the blank line policy.
    pub fn with_blank_lines(mut self, policy: BlankLines) -> Self {
        self.blank_lines = policy;
        self
    }

    /// Ignore indented continuation rows.
    pub fn with_indented_continuations(mut self) -> Self {
        self.indented_continuations = true;
        self
    }
}

/// A well-formed table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<'a> {
    /// The row as printed.
    pub line: &'a str,
    /// Whitespace-separated tokens.
    pub tokens: Vec<&'a str>,
}

/// Lines inside the layout's data window, after the blank-line policy.
pub fn data_lines<'a>(text: &'a str, layout: &TableLayout) -> Vec<&'a str> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    let end = lines.len().saturating_sub(layout.trailer_lines);
    let start = layout.header_lines.min(end);

    let mut window = Vec::with_capacity(end - start);
    for (offset, line) in lines[start..end].iter().enumerate() {
        let blank = match layout.blank_lines {
            BlankLines::Truncate => line.is_empty(),
            BlankLines::Skip => line.trim().is_empty(),
        };
        if blank {
            match layout.blank_lines {
                BlankLines::Truncate => {
                    let dropped = end - start - offset - 1;
                    if dropped > 0 {
                        debug!(
                            "{:?}: blank line ends table, {} trailing line(s) ignored",
                            layout.command, dropped
                        );
                    }
                    break;
                }
                BlankLines::Skip => continue,
            }
        }
        if layout.indented_continuations && line.starts_with(char::is_whitespace) {
            continue;
        }
        window.push(*line);
    }
    window
}

/// Tokenize the data window, failing on the first malformed row.
pub fn table_rows<'a>(text: &'a str, layout: &TableLayout) -> Result<Vec<Row<'a>>, ParseError> {
    data_lines(text, layout)
        .into_iter()
        .map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if layout.tokens.accepts(tokens.len()) {
                Ok(Row { line, tokens })
            } else {
                Err(ParseError::UnexpectedShape {
                    line: line.to_string(),
                    expected: layout.tokens.to_string(),
                })
            }
        })
        .collect()
}

/// Parse a field that has no sensible default.
pub(crate) fn parse_field<T: FromStr>(
    field: &'static str,
    value: &str,
    line: &str,
) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidField {
        field,
        value: value.to_string(),
        line: line.to_string(),
    })
}

/// Normalize a MAC address to `AA:BB:CC:DD:EE:FF`.
///
/// Accepts dotted (`0005.3346.aa12`), dashed and colon forms. Anything that
/// is not 12 hex digits is returned unchanged.
pub fn normalize_mac(raw: &str) -> String {
    let hex: String = raw
        .chars()
        .filter(|c| !matches!(c, '.' | ':' | '-'))
        .collect();

    if hex.len() != 12 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        warn!("Unrecognized MAC address format: {:?}", raw);
        return raw.to_string();
    }

    let mut mac = String::with_capacity(17);
    for (i, c) in hex.to_ascii_uppercase().chars().enumerate() {
        if i > 0 && i % 2 == 0 {
            mac.push(':');
        }
        mac.push(c);
    }
    mac
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(header: usize, trailer: usize) -> TableLayout {
        TableLayout::new("show test", header, trailer, TokenCount::OneOf(vec![2]))
    }

    #[test]
    fn test_window_matches_slice_arithmetic() {
        let text = "h1\nh2\na 1\nb 2\ntrailer";
        assert_eq!(data_lines(text, &layout(2, 1)), vec!["a 1", "b 2"]);
    }

    #[test]
    fn test_window_larger_than_output_is_empty() {
        assert!(data_lines("h1\nrow", &layout(3, 1)).is_empty());
        assert!(data_lines("", &layout(0, 1)).is_empty());
    }

    #[test]
    fn test_zero_trailer_keeps_last_line() {
        assert_eq!(data_lines("a 1\nb 2", &layout(0, 0)), vec!["a 1", "b 2"]);
    }

    #[test]
    fn test_carriage_returns_are_stripped() {
        assert_eq!(data_lines("h\r\na 1\r\nend\r\n", &layout(1, 2)), vec!["a 1"]);
    }

    #[test]
    fn test_blank_line_truncates() {
        let text = "h\na 1\n\nb 2\nc 3\nend";
        assert_eq!(data_lines(text, &layout(1, 1)), vec!["a 1"]);
    }

    #[test]
    fn test_whitespace_line_is_a_row_when_truncating() {
        let text = "h\na 1\n   \nb 2\nend";
        assert_eq!(data_lines(text, &layout(1, 1)), vec!["a 1", "   ", "b 2"]);

        let err = table_rows(text, &layout(1, 1)).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedShape { line, .. } if line == "   "));
    }

    #[test]
    fn test_blank_line_skip_policy() {
        let text = "h\na 1\n   \nb 2\nc 3\nend";
        let layout = layout(1, 1).with_blank_lines(BlankLines::Skip);
        assert_eq!(data_lines(text, &layout), vec!["a 1", "b 2", "c 3"]);
    }

    #[test]
    fn test_indented_continuations() {
        let text = "h\n10 a\n   Te 1/0/2\n20 b\nend";
        let layout = layout(1, 1).with_indented_continuations();
        assert_eq!(data_lines(text, &layout), vec!["10 a", "20 b"]);
    }

    #[test]
    fn test_malformed_row_fails_table() {
        let err = table_rows("h\na 1\nb 2 extra\nend", &layout(1, 1)).unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedShape {
                line: "b 2 extra".to_string(),
                expected: "2".to_string(),
            }
        );
    }

    #[test]
    fn test_token_count_display() {
        assert_eq!(TokenCount::OneOf(vec![6, 7]).to_string(), "6 or 7");
        assert_eq!(TokenCount::AtLeast(2).to_string(), "at least 2");
        assert!(TokenCount::Any.accepts(0));
    }

    #[test]
    fn test_normalize_mac() {
        assert_eq!(normalize_mac("0005.3346.aa12"), "00:05:33:46:AA:12");
        assert_eq!(normalize_mac("00-05-33-46-aa-12"), "00:05:33:46:AA:12");
        assert_eq!(normalize_mac("00:05:33:46:AA:12"), "00:05:33:46:AA:12");
        assert_eq!(normalize_mac("incomplete"), "incomplete");
    }
}
