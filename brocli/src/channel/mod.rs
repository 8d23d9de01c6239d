//! Remote command channel.
//!
//! The driver never talks to russh directly. It is handed a
//! [`RemoteChannel`]: something that can open an authenticated interactive
//! session, send one line and return the text the device printed in reply.
//! [`SshChannel`] is the production implementation; tests script their own.

mod buffer;
#[cfg(test)]
pub(crate) mod mock;
mod ssh;

pub use buffer::PatternBuffer;
pub use ssh::SshChannel;

use std::future::Future;
use std::time::Duration;

use regex::bytes::Regex;

use crate::error::TransportError;

/// Capability to run CLI commands on one device.
///
/// Implementations are strictly request/response: a call does not return
/// until the device finished answering, and `&mut self` keeps a second
/// command from being issued while one is in flight.
pub trait RemoteChannel: Send {
    /// Open and authenticate the interactive session.
    fn open(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Send one command line and return its output.
    ///
    /// The returned text excludes the command echo and the trailing prompt.
    fn send_command(
        &mut self,
        command: &str,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;

    /// Send a sequence of inputs, each waiting for its own pattern.
    ///
    /// Used for commands that ask for confirmation, such as `reload system`.
    fn send_interactive(
        &mut self,
        events: &[InteractiveEvent],
    ) -> impl Future<Output = Result<String, TransportError>> + Send;

    /// Tear down the session.
    fn close(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// One step of an interactive exchange.
///
/// `pattern` is what the device prints once it has consumed `input`. A step
/// without a pattern is fire-and-forget: used for the final answer to a
/// reload prompt, after which the device drops the session.
#[derive(Debug, Clone)]
pub struct InteractiveEvent {
    /// The input to send (command or answer).
    pub input: String,

    /// Pattern to wait for after sending input.
    pub pattern: Option<Regex>,

    /// Optional timeout override for this step.
    pub timeout: Option<Duration>,
}

impl InteractiveEvent {
    /// Send `input`, then wait for `pattern`.
    pub fn new(input: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            input: input.into(),
            pattern: Some(Regex::new(pattern)?),
            timeout: None,
        })
    }

    /// Send `input` without waiting for anything.
    pub fn send_only(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            pattern: None,
            timeout: None,
        }
    }

    /// Set a custom timeout for this step.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interactive_event_new() {
        let event = InteractiveEvent::new("reload system", r"\[y/n\]").unwrap();
        assert_eq!(event.input, "reload system");
        assert!(event.pattern.unwrap().is_match(b"reboot the chassis [y/n]?"));
        assert!(event.timeout.is_none());
    }

    #[test]
    fn test_interactive_event_send_only() {
        let event = InteractiveEvent::send_only("y").with_timeout(Duration::from_secs(2));
        assert!(event.pattern.is_none());
        assert_eq!(event.timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_interactive_event_bad_pattern() {
        assert!(InteractiveEvent::new("reload", r"[unclosed").is_err());
    }
}
