//! Platform definition for dialect-specific configuration.

use regex::bytes::Regex;

use crate::parse::{FactProbes, TableLayout};

/// Output layout of every table command a dialect supports.
#[derive(Debug, Clone)]
pub struct TableLayouts {
    pub interfaces: TableLayout,
    pub interface_counters: TableLayout,
    pub arp: TableLayout,
    pub mac_table: TableLayout,
    pub vlan: TableLayout,
    pub facts: TableLayout,
}

/// How a dialect reports environment sensors.
#[derive(Debug, Clone)]
pub enum EnvironmentProbe {
    /// Fan, power and temperature commands plus CPU load.
    Sensors {
        fans: TableLayout,
        power: TableLayout,
        temperature: TableLayout,
        cpu_command: String,
    },
    /// CPU load only; every sensor is reported as unsupported.
    CpuOnly { cpu_command: String },
}

impl EnvironmentProbe {
    pub fn cpu_command(&self) -> &str {
        match self {
            EnvironmentProbe::Sensors { cpu_command, .. } => cpu_command,
            EnvironmentProbe::CpuOnly { cpu_command } => cpu_command,
        }
    }
}

/// Where checkpoint and candidate configuration files live on the device.
///
/// Files are written through the `flash://` URL scheme and removed through
/// the underlying filesystem path, which the CLI exposes via `oscmd`.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    /// URL prefix used by `copy`.
    pub flash_prefix: String,
    /// Filesystem directory backing `flash://`.
    pub directory: String,
    pub running_checkpoint: String,
    pub startup_checkpoint: String,
    pub candidate: String,
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self {
            flash_prefix: "flash://".to_string(),
            directory: "/var/config/vcs/scripts".to_string(),
            running_checkpoint: "_running.cfg".to_string(),
            startup_checkpoint: "_startup.cfg".to_string(),
            candidate: "_candidate.cfg".to_string(),
        }
    }
}

impl ArtifactLayout {
    fn flash(&self, file: &str) -> String {
        format!("{}{}", self.flash_prefix, file)
    }

    fn path(&self, file: &str) -> String {
        format!("{}/{}", self.directory, file)
    }

    pub fn remove_command(&self, file: &str) -> String {
        format!("oscmd rm {}", self.path(file))
    }

    pub fn checkpoint_running_command(&self) -> String {
        format!("copy running-config {}", self.flash(&self.running_checkpoint))
    }

    pub fn checkpoint_startup_command(&self) -> String {
        format!("copy startup-config {}", self.flash(&self.startup_checkpoint))
    }

    /// Pull the candidate from `source_url` into place.
    pub fn fetch_candidate_command(&self, source_url: &str) -> String {
        format!("copy {} {}", source_url, self.flash(&self.candidate))
    }

    pub fn diff_command(&self) -> String {
        format!(
            "oscmd diff {} {}",
            self.path(&self.running_checkpoint),
            self.path(&self.candidate)
        )
    }

    pub fn apply_candidate_command(&self) -> String {
        format!("copy {} running-config", self.flash(&self.candidate))
    }

    pub fn restore_running_command(&self) -> String {
        format!("copy {} running-config", self.flash(&self.running_checkpoint))
    }
}

/// Platform definition containing all dialect-specific configuration.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Platform name (e.g. "brocade_nos").
    pub name: String,

    /// Prompt pattern, matched against the end of the output buffer.
    pub prompt: Regex,

    /// Substrings that mark a command as rejected by the device.
    pub failed_when_contains: Vec<String>,

    /// Commands to run when the session is opened.
    pub on_open_commands: Vec<String>,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,

    pub tables: TableLayouts,

    pub facts: FactProbes,

    pub environment: EnvironmentProbe,

    pub artifacts: ArtifactLayout,

    /// Command that reboots the device.
    pub reload_command: String,

    /// Confirmation question printed after `reload_command`.
    pub reload_confirm: Regex,

    /// What ends the reply to `reload_command`: the confirmation question,
    /// or the prompt when the device refused the command.
    pub reload_reply: Regex,
}

impl PlatformDefinition {
    /// Add a failure pattern.
    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    /// Add an on_open command.
    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// Set terminal dimensions.
    pub fn with_terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }
}
