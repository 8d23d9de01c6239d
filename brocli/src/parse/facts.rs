//! `show system`.

use log::debug;
use regex::Regex;
use serde::Serialize;

use super::{TableLayout, data_lines};

/// Vendor reported for every supported dialect.
pub const VENDOR: &str = "Brocade";

/// System facts. Fields the output does not mention are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facts {
    pub vendor: String,
    pub model: Option<String>,
    pub os_version: Option<String>,
    pub uptime: Option<String>,
    pub management_ip: Option<String>,
}

/// Single-line probes applied independently to every line.
///
/// The first capture group of `uptime` and `management_ip` is the value.
/// `version` must have a `version` named group and may have a `model` one.
#[derive(Debug, Clone)]
pub struct FactProbes {
    pub uptime: Regex,
    pub version: Regex,
    pub management_ip: Regex,
}

/// Run the probes over the output window.
///
/// A blank line ends extraction; facts found before it are kept.
pub fn parse_facts(text: &str, layout: &TableLayout, probes: &FactProbes) -> Facts {
    let mut facts = Facts {
        vendor: VENDOR.to_string(),
        ..Facts::default()
    };

    for line in data_lines(text, layout) {
        if let Some(caps) = probes.uptime.captures(line) {
            facts.uptime = caps.get(1).map(|m| m.as_str().to_string());
        }
        if let Some(caps) = probes.version.captures(line) {
            facts.os_version = caps.name("version").map(|m| m.as_str().to_string());
            if let Some(model) = caps.name("model") {
                facts.model = Some(model.as_str().to_string());
            }
        }
        if let Some(caps) = probes.management_ip.captures(line) {
            facts.management_ip = caps.get(1).map(|m| m.as_str().to_string());
        }
    }

    debug!("Parsed facts: {:?}", facts);
    facts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::TokenCount;

    fn layout() -> TableLayout {
        TableLayout::new("show system", 3, 1, TokenCount::Any)
    }

    fn probes() -> FactProbes {
        FactProbes {
            uptime: Regex::new(r"Up Time.*: up (.*)$").unwrap(),
            version: Regex::new(r"^(?P<model>.*) Version.*: (?P<version>.*)$").unwrap(),
            management_ip: Regex::new(r"^Management IP.*: (.*)$").unwrap(),
        }
    }

    const SYSTEM: &str = "\
Stack MAC                : 00:05:33:46:AA:12
-- UNIT 0 --
Unit Name                : sw0
Switch Status            : Online
Hardware Rev             : 2.0
NOS Version              : 7.2.0a
Up Time                  : up 12 days 4:10
Management IP            : 10.24.84.10
Current Date             : 2024-03-01
";

    #[test]
    fn test_parse_facts() {
        let facts = parse_facts(SYSTEM, &layout(), &probes());
        assert_eq!(
            facts,
            Facts {
                vendor: "Brocade".to_string(),
                model: Some("NOS".to_string()),
                os_version: Some("7.2.0a".to_string()),
                uptime: Some("12 days 4:10".to_string()),
                management_ip: Some("10.24.84.10".to_string()),
            }
        );
    }

    #[test]
    fn test_missing_probe_does_not_block_others() {
        let text = "h\nh\nh\nManagement IP : 10.0.0.1\nend";
        let facts = parse_facts(text, &layout(), &probes());
        assert_eq!(facts.management_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(facts.uptime, None);
        assert_eq!(facts.os_version, None);
    }

    #[test]
    fn test_blank_line_stops_extraction() {
        let text = "h\nh\nh\nNOS Version : 7.2.0a\n\nManagement IP : 10.0.0.1\nend";
        let facts = parse_facts(text, &layout(), &probes());
        assert_eq!(facts.os_version.as_deref(), Some("7.2.0a"));
        assert_eq!(facts.management_ip, None);
    }

    #[test]
    fn test_version_probe_without_model() {
        let probes = FactProbes {
            version: Regex::new(r"^.*Version.*: (?P<version>.*)$").unwrap(),
            ..probes()
        };
        let facts = parse_facts(SYSTEM, &layout(), &probes);
        assert_eq!(facts.os_version.as_deref(), Some("7.2.0a"));
        assert_eq!(facts.model, None);
    }
}
