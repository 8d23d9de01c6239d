//! `show ip interface brief`.
//!
//! ```text
//! Interface              IP-Address          Vrf                     Status                    Protocol
//! ==================     ==========          ==================      ====================      ========
//! Ethernet 0/1           unassigned          default-vrf             administratively down     down
//! ```
//!
//! Rows have 6 tokens, or 7 when the firmware prints the Vrf column.

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;

use super::{TableLayout, table_rows};
use crate::error::ParseError;

/// One interface from the brief table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interface {
    /// Full name, e.g. `TenGigabitEthernet 1/0/1`.
    pub name: String,
    pub interface_type: String,
    pub port: String,
    /// `None` when the device prints `unassigned`.
    pub ip_address: Option<String>,
    pub vrf: Option<String>,
    /// False when the status column says administratively down.
    pub is_enabled: bool,
    /// Line protocol state.
    pub is_up: bool,
}

/// Parse the interface table, keyed by interface name in device order.
pub fn parse_interfaces(
    text: &str,
    layout: &TableLayout,
) -> Result<IndexMap<String, Interface>, ParseError> {
    let mut interfaces = IndexMap::new();

    for row in table_rows(text, layout)? {
        let (interface_type, port, ip, vrf, status, protocol) = match row.tokens[..] {
            [kind, port, ip, status, _, protocol] => (kind, port, ip, None, status, protocol),
            [kind, port, ip, vrf, status, _, protocol] => {
                (kind, port, ip, Some(vrf), status, protocol)
            }
            _ => {
                return Err(ParseError::UnexpectedShape {
                    line: row.line.to_string(),
                    expected: "6 or 7".to_string(),
                });
            }
        };

        let name = format!("{interface_type} {port}");
        let interface = Interface {
            name: name.clone(),
            interface_type: interface_type.to_string(),
            port: port.to_string(),
            ip_address: (!ip.eq_ignore_ascii_case("unassigned")).then(|| ip.to_string()),
            vrf: vrf.map(str::to_string),
            is_enabled: !status.to_lowercase().contains("admin"),
            is_up: protocol.to_lowercase().contains("up"),
        };

        match interfaces.entry(name) {
            Entry::Occupied(entry) => {
                return Err(ParseError::DuplicateKey {
                    key: entry.key().clone(),
                });
            }
            Entry::Vacant(entry) => {
                entry.insert(interface);
            }
        }
    }

    Ok(interfaces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::TokenCount;

    fn layout() -> TableLayout {
        TableLayout::new("show ip interface brief", 3, 1, TokenCount::OneOf(vec![6, 7]))
    }

    const WITH_VRF: &str = "\
Interface              IP-Address          Vrf                     Status                    Protocol
==================     ==========          ==================      ====================      ========
Ethernet 0/1           unassigned          default-vrf             administratively down     down
Ethernet 0/2           10.1.1.2            mgmt-vrf                Admin down                up
Ve 100                 192.168.0.1         default-vrf             link up                   up
";

    #[test]
    fn test_header_window_is_per_command() {
        // The window is header 3, so the first data row here is swallowed by
        // the header skip and the trailing newline yields the trailer line.
        let text = "Interface IP-Address Status Protocol\n===\nEthernet 0/1 unassigned administratively down down\n";
        assert!(parse_interfaces(text, &layout()).unwrap().is_empty());
    }

    #[test]
    fn test_rows_with_vrf_column() {
        let text = format!("\n{WITH_VRF}");
        let interfaces = parse_interfaces(&text, &layout()).unwrap();

        assert_eq!(interfaces.len(), 3);
        let names: Vec<&str> = interfaces.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Ethernet 0/1", "Ethernet 0/2", "Ve 100"]);

        let eth1 = &interfaces["Ethernet 0/1"];
        assert_eq!(eth1.interface_type, "Ethernet");
        assert_eq!(eth1.port, "0/1");
        assert_eq!(eth1.ip_address, None);
        assert_eq!(eth1.vrf.as_deref(), Some("default-vrf"));
        assert!(!eth1.is_enabled);
        assert!(!eth1.is_up);

        let eth2 = &interfaces["Ethernet 0/2"];
        assert_eq!(eth2.ip_address.as_deref(), Some("10.1.1.2"));
        assert!(!eth2.is_enabled, "status match is case-insensitive");
        assert!(eth2.is_up);

        let ve = &interfaces["Ve 100"];
        assert!(ve.is_enabled);
        assert!(ve.is_up);
    }

    #[test]
    fn test_rows_without_vrf_column() {
        let text = "
Interface                      IP-Address      Status                    Protocol
==========================     ==========      ====================      ========
GigabitEthernet 0/1             unassigned        administratively down     down
GigabitEthernet 0/2             10.0.0.2          protocol down             down
";
        let interfaces = parse_interfaces(text, &layout()).unwrap();
        assert_eq!(interfaces.len(), 2);
        assert!(interfaces["GigabitEthernet 0/1"].vrf.is_none());
        assert!(interfaces["GigabitEthernet 0/2"].is_enabled);
        assert!(!interfaces["GigabitEthernet 0/2"].is_up);
    }

    #[test]
    fn test_blank_line_drops_remaining_rows() {
        let text = "
Interface  IP-Address  Status  Protocol
=========  ==========  ======  ========
Ethernet 0/1 unassigned administratively down down

Ethernet 0/2 unassigned administratively down down
Ethernet 0/3 unassigned administratively down down
";
        let interfaces = parse_interfaces(text, &layout()).unwrap();
        assert_eq!(interfaces.keys().collect::<Vec<_>>(), vec!["Ethernet 0/1"]);
    }

    #[test]
    fn test_short_row_is_fatal() {
        let text = "
Interface  IP-Address  Status  Protocol
=========  ==========  ======  ========
Ethernet 0/1 unassigned administratively down down
Ethernet 0/2 unassigned up up
";
        let err = parse_interfaces(text, &layout()).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedShape { ref line, .. } if line.contains("0/2")));
    }

    #[test]
    fn test_duplicate_interface_is_rejected() {
        let text = "\
h
h
h
Ethernet 0/1 unassigned administratively down down
Ethernet 0/1 unassigned administratively down down
";
        assert_eq!(
            parse_interfaces(text, &layout()).unwrap_err(),
            ParseError::DuplicateKey {
                key: "Ethernet 0/1".to_string()
            }
        );
    }
}
