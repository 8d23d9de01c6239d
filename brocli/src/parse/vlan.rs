//! `show vlan brief`.

use serde::Serialize;

use super::{TableLayout, parse_field, table_rows};
use crate::error::ParseError;

/// One VLAN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vlan {
    pub vlan_id: u16,
    pub name: String,
}

/// Parse the VLAN table. Only the id and name columns are read.
pub fn parse_vlan_table(text: &str, layout: &TableLayout) -> Result<Vec<Vlan>, ParseError> {
    table_rows(text, layout)?
        .into_iter()
        .map(|row| match row.tokens[..] {
            [id, name, ..] => Ok(Vlan {
                vlan_id: parse_field("vlan", id, row.line)?,
                name: name.to_string(),
            }),
            _ => Err(ParseError::UnexpectedShape {
                line: row.line.to_string(),
                expected: "at least 2".to_string(),
            }),
        })
        .collect()
}
