//! `show interface stats brief`.

use serde::Serialize;

use super::{TableLayout, parse_field, table_rows};
use crate::error::ParseError;

/// Packet counters of one interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceCounters {
    pub name: String,
    pub interface_type: String,
    pub port: String,
    pub rx_packets: u64,
    pub tx_packets: u64,
    pub rx_errors: u64,
    pub tx_errors: u64,
    pub rx_discards: u64,
    pub tx_discards: u64,
    pub rx_crc_errors: u64,
}

/// Parse the interface counter table.
pub fn parse_interface_counters(
    text: &str,
    layout: &TableLayout,
) -> Result<Vec<InterfaceCounters>, ParseError> {
    table_rows(text, layout)?
        .into_iter()
        .map(|row| {
            let [
                kind,
                port,
                rx_packets,
                tx_packets,
                rx_errors,
                tx_errors,
                rx_discards,
                tx_discards,
                rx_crc,
            ] = row.tokens[..]
            else {
                return Err(ParseError::UnexpectedShape {
                    line: row.line.to_string(),
                    expected: "9".to_string(),
                });
            };

            Ok(InterfaceCounters {
                name: format!("{kind} {port}"),
                interface_type: kind.to_string(),
                port: port.to_string(),
                rx_packets: parse_field("rx_packets", rx_packets, row.line)?,
                tx_packets: parse_field("tx_packets", tx_packets, row.line)?,
                rx_errors: parse_field("rx_errors", rx_errors, row.line)?,
                tx_errors: parse_field("tx_errors", tx_errors, row.line)?,
                rx_discards: parse_field("rx_discards", rx_discards, row.line)?,
                tx_discards: parse_field("tx_discards", tx_discards, row.line)?,
                rx_crc_errors: parse_field("rx_crc_errors", rx_crc, row.line)?,
            })
        })
        .collect()
}
