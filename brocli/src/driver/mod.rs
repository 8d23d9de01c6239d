//! High-level driver for switch interaction.
//!
//! [`Driver`] is the operation set offered to callers: session control,
//! raw commands, the telemetry getters and the configuration lifecycle. It
//! owns one [`Session`] and never shares it.

mod builder;
mod lifecycle;
mod relay;
mod session;

pub use builder::DriverBuilder;
pub use lifecycle::{CommitOutcome, ConfigLifecycle, ConfigState, LoadMode};
pub use relay::{FileRelay, LocalExportRelay, StagedFile};
pub use session::{Session, SessionState};

use std::path::Path;

use indexmap::IndexMap;
use log::debug;

use crate::channel::RemoteChannel;
use crate::error::{Error, LifecycleError, Result};
use crate::parse::{
    self, ArpEntry, Environment, FanStatus, Facts, Interface, InterfaceCounters, MacEntry,
    PowerStatus, TemperatureStatus, TableLayout, Vlan,
};
use crate::platform::{EnvironmentProbe, PlatformDefinition};

/// Driver for one switch.
pub struct Driver<C, R = LocalExportRelay> {
    platform: PlatformDefinition,
    session: Session<C>,
    lifecycle: ConfigLifecycle,
    relay: Option<R>,
}

impl<C: RemoteChannel, R: FileRelay> Driver<C, R> {
    pub fn new(platform: PlatformDefinition, session: Session<C>, relay: Option<R>) -> Self {
        let lifecycle = ConfigLifecycle::new(&platform);
        Self {
            platform,
            session,
            lifecycle,
            relay,
        }
    }

    pub fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn config_state(&self) -> ConfigState {
        self.lifecycle.state()
    }

    pub fn has_running_checkpoint(&self) -> bool {
        self.lifecycle.has_running_checkpoint()
    }

    pub fn has_relay(&self) -> bool {
        self.relay.is_some()
    }

    /// Open the session to the device.
    pub async fn open(&mut self) -> Result<()> {
        self.session.open().await
    }

    /// Close the session. Closing twice is a no-op.
    pub async fn close(&mut self) -> Result<()> {
        self.session.close().await
    }

    /// Run raw commands in order; the first rejection fails the batch.
    pub async fn run_commands<S: AsRef<str>>(
        &mut self,
        commands: &[S],
    ) -> Result<IndexMap<String, String>> {
        self.session.execute_all(commands).await
    }

    pub async fn get_facts(&mut self) -> Result<Facts> {
        let layout = &self.platform.tables.facts;
        let output = self.session.execute(&layout.command).await?;
        Ok(parse::parse_facts(&output, layout, &self.platform.facts))
    }

    /// Sensor readings. Sensors the device cannot report come back as the
    /// [`parse::UNSUPPORTED_SENSOR`] placeholder.
    pub async fn get_environment(&mut self) -> Result<Environment> {
        let (fans, power, temperature) = match self.platform.environment.clone() {
            EnvironmentProbe::CpuOnly { .. } => {
                let cpu_load = self.cpu_load().await?;
                return Ok(Environment::unsupported(cpu_load));
            }
            EnvironmentProbe::Sensors {
                fans,
                power,
                temperature,
                ..
            } => (fans, power, temperature),
        };

        let fans = match self.sensor_output(&fans).await? {
            Some(output) => parse::parse_fans(&output, &fans),
            None => IndexMap::new(),
        };
        let power = match self.sensor_output(&power).await? {
            Some(output) => parse::parse_power(&output, &power),
            None => IndexMap::new(),
        };
        let temperature = match self.sensor_output(&temperature).await? {
            Some(output) => parse::parse_temperature(&output, &temperature),
            None => IndexMap::new(),
        };

        Ok(Environment {
            cpu_load: self.cpu_load().await?,
            fans: parse::or_unsupported(fans, FanStatus::unsupported()),
            power: parse::or_unsupported(power, PowerStatus::unsupported()),
            temperature: parse::or_unsupported(temperature, TemperatureStatus::unsupported()),
        })
    }

    pub async fn get_interfaces(&mut self) -> Result<IndexMap<String, Interface>> {
        let layout = &self.platform.tables.interfaces;
        let output = self.session.execute(&layout.command).await?;
        Ok(parse::parse_interfaces(&output, layout)?)
    }

    pub async fn get_interface_counters(&mut self) -> Result<Vec<InterfaceCounters>> {
        let layout = &self.platform.tables.interface_counters;
        let output = self.session.execute(&layout.command).await?;
        Ok(parse::parse_interface_counters(&output, layout)?)
    }

    pub async fn get_arp_table(&mut self) -> Result<Vec<ArpEntry>> {
        let layout = &self.platform.tables.arp;
        let output = self.session.execute(&layout.command).await?;
        Ok(parse::parse_arp_table(&output, layout)?)
    }

    pub async fn get_mac_table(&mut self) -> Result<Vec<MacEntry>> {
        let layout = &self.platform.tables.mac_table;
        let output = self.session.execute(&layout.command).await?;
        Ok(parse::parse_mac_table(&output, layout)?)
    }

    pub async fn get_vlan_table(&mut self) -> Result<Vec<Vlan>> {
        let layout = &self.platform.tables.vlan;
        let output = self.session.execute(&layout.command).await?;
        Ok(parse::parse_vlan_table(&output, layout)?)
    }

    pub async fn checkpoint_running(&mut self) -> Result<()> {
        self.lifecycle.checkpoint_running(&mut self.session).await
    }

    pub async fn checkpoint_startup(&mut self) -> Result<()> {
        self.lifecycle.checkpoint_startup(&mut self.session).await
    }

    /// Stage a local configuration file as the candidate.
    pub async fn load_candidate(&mut self, local: impl AsRef<Path>, mode: LoadMode) -> Result<()> {
        let relay = self.relay.as_ref().ok_or(LifecycleError::NoRelay)?;
        self.lifecycle
            .load_candidate(&mut self.session, relay, local.as_ref(), mode)
            .await
    }

    /// Device-computed diff between the running checkpoint and the candidate.
    pub async fn compare(&mut self) -> Result<String> {
        self.lifecycle.compare(&mut self.session).await
    }

    pub async fn commit(&mut self) -> Result<CommitOutcome> {
        self.lifecycle.commit(&mut self.session).await
    }

    pub async fn discard(&mut self) -> Result<()> {
        self.lifecycle.discard(&mut self.session).await
    }

    /// Restore the running checkpoint and reboot. The driver must be
    /// reopened afterwards.
    pub async fn rollback(&mut self) -> Result<()> {
        self.lifecycle.rollback(&mut self.session).await
    }

    /// Reload the device. The driver must be reopened afterwards.
    pub async fn reboot(&mut self) -> Result<()> {
        self.lifecycle.reboot(&mut self.session).await
    }

    /// Output of a sensor command, `None` if the device does not know it.
    async fn sensor_output(&mut self, layout: &TableLayout) -> Result<Option<String>> {
        match self.session.execute(&layout.command).await {
            Ok(output) => Ok(Some(output)),
            Err(Error::CommandRejected { command, .. }) => {
                debug!("{:?} not supported, reporting placeholder", command);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn cpu_load(&mut self) -> Result<f64> {
        let command = self.platform.environment.cpu_command().to_string();
        match self.session.execute(&command).await {
            Ok(output) => Ok(parse::parse_cpu_load(&output)),
            Err(Error::CommandRejected { .. }) => {
                debug!("{:?} not supported, reporting 0 load", command);
                Ok(0.0)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::mock::ScriptedChannel;
    use crate::error::{ConnectionFailure, ParseError};
    use crate::parse::UNSUPPORTED_SENSOR;
    use crate::platform::Platform;
    use tokio_test::assert_ok;

    const REJECTED: &str = "              ^\n% Invalid input detected at '^' marker.";

    async fn open_driver(platform: Platform, channel: ScriptedChannel) -> Driver<ScriptedChannel> {
        let mut driver = DriverBuilder::new("sw0")
            .platform(platform)
            .build_with_channel(channel);
        driver.open().await.unwrap();
        driver
    }

    #[tokio::test]
    async fn test_open_unreachable_host() {
        let mut driver = DriverBuilder::new("192.0.2.1")
            .port(2222)
            .build_with_channel(ScriptedChannel::unreachable());

        let err = driver.open().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Connection(ConnectionFailure { ref host, port: 2222, .. }) if host == "192.0.2.1"
        ));
        assert_ne!(driver.session_state(), SessionState::Open);
    }

    #[tokio::test]
    async fn test_run_commands() {
        let channel = ScriptedChannel::new()
            .reply("show clock", "10:00")
            .reply("show version", "NOS 7.2.0a");
        let mut driver = open_driver(Platform::BrocadeNos, channel).await;

        let outputs = driver.run_commands(&["show clock", "show version"]).await.unwrap();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs["show version"], "NOS 7.2.0a");
        assert_ok!(driver.close().await);
    }

    #[tokio::test]
    async fn test_get_interfaces() {
        let output = "
Interface              IP-Address          Vrf                     Status                    Protocol
==================     ==========          ==================      ====================      ========
TenGigabitEthernet 1/0/1   10.1.1.1        default-vrf             link up                   up
TenGigabitEthernet 1/0/2   unassigned      default-vrf             administratively down     down
";
        let channel = ScriptedChannel::new().reply("show ip interface brief", output);
        let mut driver = open_driver(Platform::BrocadeNos, channel).await;

        let interfaces = driver.get_interfaces().await.unwrap();
        assert_eq!(interfaces.len(), 2);
        assert!(interfaces["TenGigabitEthernet 1/0/1"].is_up);
        assert!(!interfaces["TenGigabitEthernet 1/0/2"].is_enabled);
        driver.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_parse_failure_is_typed() {
        let output = "h\nh\nh\nTenGigabitEthernet 1/0/1 up up\nend";
        let channel = ScriptedChannel::new().reply("show ip interface brief", output);
        let mut driver = open_driver(Platform::BrocadeNos, channel).await;

        let err = driver.get_interfaces().await.unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::UnexpectedShape { .. })));
        driver.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_get_arp_and_mac_tables() {
        let arp = "\
Address         Mac-address     Interface       MacResolved  Age        Type
----------------------------------------------------------------------------
10.24.84.1      0005.3346.aa12  Mgmt0           yes          -          Static
";
        let mac = "\
VlanId   Mac-address       Type     State        Ports
10       0005.3346.aa12    Dynamic  Active       Te 1/0/1
Total MAC addresses    : 1";
        let channel = ScriptedChannel::new()
            .reply("show arp", arp)
            .reply("show mac-address-table", mac);
        let mut driver = open_driver(Platform::BrocadeNos, channel).await;

        let arp = driver.get_arp_table().await.unwrap();
        assert_eq!(arp.len(), 1);
        assert_eq!(arp[0].age, 0.0);

        let mac = driver.get_mac_table().await.unwrap();
        assert_eq!(mac[0].vlan_id, 10);
        assert_eq!(mac[0].mac, arp[0].mac);
        driver.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_get_facts() {
        let output = "\
Stack MAC                : 00:05:33:46:AA:12
-- UNIT 0 --
Unit Name                : sw0
NOS Version              : 7.2.0a
Up Time                  : up 1 day 2:03
Management IP            : 10.24.84.10
";
        let channel = ScriptedChannel::new().reply("show system", output);
        let mut driver = open_driver(Platform::BrocadeNos, channel).await;

        let facts = driver.get_facts().await.unwrap();
        assert_eq!(facts.vendor, "Brocade");
        assert_eq!(facts.model.as_deref(), Some("NOS"));
        assert_eq!(facts.management_ip.as_deref(), Some("10.24.84.10"));
        driver.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_get_environment() {
        let channel = ScriptedChannel::new()
            .reply("show environment fan", "Fan 1 is Ok, speed is 6818 RPM")
            .reply("show environment power", REJECTED)
            .reply(
                "show environment temp",
                "h\nh\nh\n1 Ok 41 C\nTotal sensors: 1\n",
            )
            .reply(
                "show process cpu",
                "Realtime Statistics for Cpu :\nOne minute: 4.25; Five minutes: 3.00",
            );
        let mut driver = open_driver(Platform::BrocadeNos, channel).await;

        let env = driver.get_environment().await.unwrap();
        assert_eq!(env.cpu_load, 4.25);
        assert!(env.fans["1"].status);
        assert_eq!(env.power.keys().collect::<Vec<_>>(), vec![UNSUPPORTED_SENSOR]);
        assert_eq!(env.temperature["1"].temperature, 41.0);
        driver.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_basic_environment_reads_cpu_only() {
        let channel = ScriptedChannel::new().reply(
            "show proc cpu",
            "Realtime Statistics for Cpu :\nOne minute: 1.50; Five minutes: 1.00",
        );
        let mut driver = open_driver(Platform::BrocadeNosBasic, channel).await;

        let env = driver.get_environment().await.unwrap();
        assert_eq!(env, Environment::unsupported(1.5));
        assert_eq!(driver.session.channel().sent, vec!["show proc cpu"]);
        driver.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_environment_transport_failure_propagates() {
        let channel = ScriptedChannel::new().disconnect_on("show environment fan");
        let mut driver = open_driver(Platform::BrocadeNos, channel).await;

        let err = driver.get_environment().await.unwrap_err();
        assert!(err.is_connection_failure());
        assert_eq!(driver.session_state(), SessionState::Failed);
    }

    #[tokio::test]
    async fn test_load_candidate_without_relay() {
        let mut driver = open_driver(Platform::BrocadeNos, ScriptedChannel::new()).await;
        let err = driver
            .load_candidate("new.cfg", LoadMode::Replace)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Lifecycle(LifecycleError::NoRelay)));
        driver.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_config_replace_workflow() {
        let export_dir = tempfile::tempdir().unwrap();
        let local = export_dir.path().join("source.cfg");
        std::fs::write(&local, "hostname sw1\n").unwrap();
        let diff = "< hostname sw0\n---\n> hostname sw1";

        let channel = ScriptedChannel::new().reply(
            "oscmd diff /var/config/vcs/scripts/_running.cfg /var/config/vcs/scripts/_candidate.cfg",
            diff,
        );
        let mut driver = DriverBuilder::new("sw0")
            .relay(crate::config::RelayConfig {
                host: "10.0.0.5".to_string(),
                username: "ops".to_string(),
                password: secrecy::SecretString::from("pw".to_string()),
                export_dir: export_dir.path().join("export"),
                remote_dir: "tmp".to_string(),
            })
            .build_with_channel(channel);
        std::fs::create_dir(export_dir.path().join("export")).unwrap();
        driver.open().await.unwrap();

        driver.checkpoint_running().await.unwrap();
        driver.load_candidate(&local, LoadMode::Replace).await.unwrap();
        assert_eq!(driver.config_state(), ConfigState::Staged(LoadMode::Replace));
        assert_eq!(driver.compare().await.unwrap(), diff);

        let outcome = driver.commit().await.unwrap();
        assert!(outcome.candidate_discarded);
        assert!(driver.compare().await.is_err());

        assert!(
            driver
                .session
                .channel()
                .sent
                .contains(&"copy scp://ops:pw@10.0.0.5/tmp/source.cfg flash://_candidate.cfg".to_string())
        );
        driver.close().await.unwrap();
    }
}
