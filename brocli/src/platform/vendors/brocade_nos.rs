//! Brocade Network OS (VDX) and SLX-OS.
//!
//! Exec prompts end in `#`, configuration prompts look like
//! `sw0(config-if-te-1/0/1)#`. Output is not paged once
//! `terminal length 0` has been sent.

use regex::Regex as TextRegex;
use regex::bytes::Regex;

use crate::parse::{BlankLines, FactProbes, TableLayout, TokenCount};
use crate::platform::{ArtifactLayout, EnvironmentProbe, PlatformDefinition, TableLayouts};

pub(crate) const PROMPT: &str = r"(?m)^[\w.\-@/: ]{1,63}(?:\([\w.\-@/:+]{0,63}\))?[#>]\s?$";

const RELOAD_CONFIRM: &str = r"\[y/n\]\??\s*:?\s*$";

/// Table layouts shared by every NOS dialect.
pub(crate) fn table_layouts() -> TableLayouts {
    TableLayouts {
        interfaces: TableLayout::new("show ip interface brief", 3, 1, TokenCount::OneOf(vec![6, 7])),
        interface_counters: TableLayout::new(
            "show interface stats brief",
            4,
            1,
            TokenCount::OneOf(vec![9]),
        ),
        arp: TableLayout::new("show arp", 2, 1, TokenCount::OneOf(vec![6])),
        mac_table: TableLayout::new("show mac-address-table", 1, 1, TokenCount::OneOf(vec![6])),
        vlan: TableLayout::new("show vlan brief", 5, 1, TokenCount::AtLeast(2))
            .with_blank_lines(BlankLines::Skip)
            .with_indented_continuations(),
        facts: TableLayout::new("show system", 3, 1, TokenCount::Any),
    }
}

pub(crate) fn definition(
    name: &str,
    facts: FactProbes,
    environment: EnvironmentProbe,
) -> PlatformDefinition {
    PlatformDefinition {
        name: name.to_string(),
        prompt: Regex::new(PROMPT).unwrap(),
        failed_when_contains: vec![],
        on_open_commands: vec![],
        terminal_width: 511,
        terminal_height: 24,
        tables: table_layouts(),
        facts,
        environment,
        artifacts: ArtifactLayout::default(),
        reload_command: "reload system".to_string(),
        reload_confirm: Regex::new(RELOAD_CONFIRM).unwrap(),
        reload_reply: Regex::new(&format!("(?:{RELOAD_CONFIRM})|(?:{PROMPT})")).unwrap(),
    }
    .with_failure_pattern("Invalid input detected")
    .with_on_open_command("terminal length 0")
}

/// Create the Brocade NOS platform definition.
pub fn platform() -> PlatformDefinition {
    let facts = FactProbes {
        uptime: TextRegex::new(r"Up Time.*: up (.*)$").unwrap(),
        version: TextRegex::new(r"^(?P<model>.*) Version.*: (?P<version>.*)$").unwrap(),
        management_ip: TextRegex::new(r"^Management IP.*: (.*)$").unwrap(),
    };

    let environment = EnvironmentProbe::Sensors {
        fans: TableLayout::new("show environment fan", 0, 0, TokenCount::Any)
            .with_blank_lines(BlankLines::Skip),
        power: TableLayout::new("show environment power", 1, 1, TokenCount::Any)
            .with_blank_lines(BlankLines::Skip),
        temperature: TableLayout::new("show environment temp", 3, 1, TokenCount::Any)
            .with_blank_lines(BlankLines::Skip),
        cpu_command: "show process cpu".to_string(),
    };

    definition("brocade_nos", facts, environment)
}
