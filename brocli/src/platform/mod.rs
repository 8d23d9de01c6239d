//! Platform definitions for the supported switch dialects.
//!
//! A dialect is a strategy table ([`PlatformDefinition`]): prompt pattern,
//! rejection markers, per-command table layouts, fact probes, environment
//! strategy and configuration artifact names. [`Platform`] is the tag that
//! selects one at construction time.

mod definition;
pub mod vendors;

pub use definition::{ArtifactLayout, EnvironmentProbe, PlatformDefinition, TableLayouts};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Supported dialects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Network OS / SLX-OS with environment sensors.
    #[default]
    BrocadeNos,
    /// Minimal dialect, CPU load only.
    BrocadeNosBasic,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::BrocadeNos, Platform::BrocadeNosBasic];

    pub fn name(self) -> &'static str {
        match self {
            Platform::BrocadeNos => "brocade_nos",
            Platform::BrocadeNosBasic => "brocade_nos_basic",
        }
    }

    /// Build the dialect's definition.
    pub fn definition(self) -> PlatformDefinition {
        match self {
            Platform::BrocadeNos => vendors::brocade_nos::platform(),
            Platform::BrocadeNosBasic => vendors::brocade_nos_basic::platform(),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Platform::ALL
            .into_iter()
            .find(|platform| platform.name() == s)
            .ok_or_else(|| Error::InvalidArgument {
                message: format!("unknown platform {s:?}"),
            })
    }
}
