//! `show mac-address-table`.

use serde::Serialize;

use super::{TableLayout, normalize_mac, parse_field, table_rows};
use crate::error::ParseError;

/// One MAC address table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacEntry {
    pub vlan_id: u16,
    pub mac: String,
    pub interface: String,
    pub is_static: bool,
    pub is_active: bool,
}

/// Parse the MAC address table.
///
/// Rows are `vlan mac type state interface-type interface-port`.
pub fn parse_mac_table(text: &str, layout: &TableLayout) -> Result<Vec<MacEntry>, ParseError> {
    table_rows(text, layout)?
        .into_iter()
        .map(|row| match row.tokens[..] {
            [vlan, mac, kind, state, if_type, if_port] => Ok(MacEntry {
                vlan_id: parse_field("vlan", vlan, row.line)?,
                mac: normalize_mac(mac),
                interface: format!("{if_type} {if_port}"),
                is_static: kind == "Static",
                is_active: state != "Inactive",
            }),
            _ => Err(ParseError::UnexpectedShape {
                line: row.line.to_string(),
                expected: "6".to_string(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::TokenCount;

    fn layout() -> TableLayout {
        TableLayout::new("show mac-address-table", 1, 1, TokenCount::OneOf(vec![6]))
    }

    #[test]
    fn test_parse_mac_table() {
        let text = "\
VlanId   Mac-address       Type     State        Ports
1        0005.3346.aa12    Dynamic  Active       Te 1/0/1
100      0005.3346.aa13    Static   Inactive     Te 1/0/2
Total MAC addresses    : 2";

        let entries = parse_mac_table(text, &layout()).unwrap();
        assert_eq!(
            entries,
            vec![
                MacEntry {
                    vlan_id: 1,
                    mac: "00:05:33:46:AA:12".to_string(),
                    interface: "Te 1/0/1".to_string(),
                    is_static: false,
                    is_active: true,
                },
                MacEntry {
                    vlan_id: 100,
                    mac: "00:05:33:46:AA:13".to_string(),
                    interface: "Te 1/0/2".to_string(),
                    is_static: true,
                    is_active: false,
                },
            ]
        );
    }

    #[test]
    fn test_non_numeric_vlan_fails() {
        let text = "header\nall 0005.3346.aa12 Dynamic Active Te 1/0/1\nend";
        let err = parse_mac_table(text, &layout()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidField { field: "vlan", .. }));
    }

    #[test]
    fn test_empty_table() {
        let text = "VlanId   Mac-address       Type     State        Ports\nTotal MAC addresses    : 0";
        assert!(parse_mac_table(text, &layout()).unwrap().is_empty());
    }
}
