//! `show arp`.

use log::warn;
use serde::Serialize;

use super::{TableLayout, normalize_mac, table_rows};
use crate::error::ParseError;

/// One ARP cache entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArpEntry {
    pub ip: String,
    pub mac: String,
    pub interface: String,
    /// Age in seconds; static entries (`-`) and unreadable ages are 0.
    pub age: f64,
    /// `Dynamic`, `Static`, ...
    pub resolution_type: String,
}

/// Parse the ARP table.
///
/// Rows are `address mac interface mac-resolved age type`.
pub fn parse_arp_table(text: &str, layout: &TableLayout) -> Result<Vec<ArpEntry>, ParseError> {
    table_rows(text, layout)?
        .into_iter()
        .map(|row| match row.tokens[..] {
            [ip, mac, interface, _resolved, age, kind] => Ok(ArpEntry {
                ip: ip.to_string(),
                mac: normalize_mac(mac),
                interface: interface.to_string(),
                age: parse_age(age),
                resolution_type: kind.to_string(),
            }),
            _ => Err(ParseError::UnexpectedShape {
                line: row.line.to_string(),
                expected: "6".to_string(),
            }),
        })
        .collect()
}

fn parse_age(age: &str) -> f64 {
    if age == "-" {
        return 0.0;
    }
    match age.parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => secs,
        _ => {
            warn!("Unable to convert ARP age {:?} to seconds, using 0", age);
            0.0
        }
    }
}
