//! Scripted in-memory channel for driver tests.

use std::collections::HashMap;

use super::{InteractiveEvent, RemoteChannel};
use crate::error::TransportError;

/// Replies to commands from a fixed script and records what was sent.
#[derive(Debug, Default)]
pub(crate) struct ScriptedChannel {
    replies: HashMap<String, String>,
    /// Commands whose reply is a transport failure.
    broken: Vec<String>,
    /// Commands the device never answers.
    hanging: Vec<String>,
    pub(crate) fail_open: bool,
    pub(crate) sent: Vec<String>,
    pub(crate) opened: usize,
    pub(crate) closed: usize,
}

impl ScriptedChannel {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(mut self, command: &str, output: &str) -> Self {
        self.replies.insert(command.to_string(), output.to_string());
        self
    }

    pub(crate) fn disconnect_on(mut self, command: &str) -> Self {
        self.broken.push(command.to_string());
        self
    }

    pub(crate) fn hang_on(mut self, command: &str) -> Self {
        self.hanging.push(command.to_string());
        self
    }

    pub(crate) fn unreachable() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }
}

impl RemoteChannel for ScriptedChannel {
    async fn open(&mut self) -> Result<(), TransportError> {
        if self.fail_open {
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }
        self.opened += 1;
        Ok(())
    }

    async fn send_command(&mut self, command: &str) -> Result<String, TransportError> {
        self.sent.push(command.to_string());
        if self.broken.iter().any(|c| c == command) {
            return Err(TransportError::Disconnected);
        }
        if self.hanging.iter().any(|c| c == command) {
            std::future::pending::<()>().await;
        }
        Ok(self.replies.get(command).cloned().unwrap_or_default())
    }

    async fn send_interactive(
        &mut self,
        events: &[InteractiveEvent],
    ) -> Result<String, TransportError> {
        let mut output = String::new();
        for event in events {
            self.sent.push(event.input.clone());
            if self.broken.contains(&event.input) {
                return Err(TransportError::Disconnected);
            }
            if let Some(reply) = self.replies.get(&event.input) {
                output.push_str(reply);
            }
        }
        Ok(output)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closed += 1;
        Ok(())
    }
}
