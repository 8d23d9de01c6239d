//! # brocli
//!
//! Async SSH driver for Brocade NOS / SLX switches.
//!
//! brocli logs into the switch CLI over an interactive SSH shell, runs show
//! commands and parses their free-text output into typed records. It also
//! drives the configuration workflow the switch supports from its CLI:
//! checkpoint, stage a candidate through a relay host, device-side diff,
//! commit, discard, rollback and reboot.
//!
//! ## Features
//!
//! - Async SSH connections via russh
//! - Prompt detection with a tail-searched pattern buffer
//! - Parsers for interfaces, counters, ARP, MAC and VLAN tables, sensors and
//!   system facts, with per-dialect header/trailer layouts
//! - Typed errors separating device rejections, parse failures and dead sessions
//! - Explicit, queryable candidate configuration state
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use brocli::{DriverBuilder, Platform};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), brocli::Error> {
//!     let mut driver = DriverBuilder::new("10.24.84.10")
//!         .username("admin")
//!         .password("password")
//!         .platform(Platform::BrocadeNos)
//!         .build()?;
//!
//!     driver.open().await?;
//!
//!     for (name, interface) in driver.get_interfaces().await? {
//!         println!("{name}: up={}", interface.is_up);
//!     }
//!
//!     driver.close().await?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod config;
pub mod driver;
pub mod error;
pub mod parse;
pub mod platform;
pub mod transport;

// Re-export main types for convenience
pub use config::{DriverConfig, RelayConfig};
pub use driver::{
    CommitOutcome, ConfigState, Driver, DriverBuilder, LoadMode, Session, SessionState,
};
pub use error::{ConnectionFailure, Error, ParseError, Result};
pub use platform::{Platform, PlatformDefinition};
pub use transport::{AuthMethod, HostKeyVerification, SshConfig};
