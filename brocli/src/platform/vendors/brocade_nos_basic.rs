//! Minimal Brocade NOS dialect.
//!
//! For firmware without the environment commands: sensors are always
//! reported as unsupported, and `show system` is probed for version,
//! uptime and management address only.

use regex::Regex;

use crate::parse::FactProbes;
use crate::platform::{EnvironmentProbe, PlatformDefinition};

use super::brocade_nos;

/// Create the basic Brocade NOS platform definition.
pub fn platform() -> PlatformDefinition {
    let facts = FactProbes {
        uptime: Regex::new(r"Up Time.*: (.*)$").unwrap(),
        version: Regex::new(r"^.*Version.*: (?P<version>.*)$").unwrap(),
        management_ip: Regex::new(r"^Management IP.*: (.*)$").unwrap(),
    };

    let environment = EnvironmentProbe::CpuOnly {
        cpu_command: "show proc cpu".to_string(),
    };

    brocade_nos::definition("brocade_nos_basic", facts, environment)
}
