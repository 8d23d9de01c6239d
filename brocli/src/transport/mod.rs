//! SSH transport layer wrapping russh.
//!
//! Connection setup, authentication, host-key checking and opening the
//! interactive PTY shell the switch CLI runs in.

pub mod config;
mod ssh;

pub use config::{AuthMethod, HostKeyVerification, SshConfig};
pub use ssh::SshTransport;
