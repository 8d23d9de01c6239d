//! SSH-backed remote channel.

use std::time::Duration;

use log::{debug, trace};
use regex::bytes::Regex;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};
use tokio::time::Instant;

use super::buffer::PatternBuffer;
use super::{InteractiveEvent, RemoteChannel};
use crate::error::TransportError;
use crate::transport::{SshConfig, SshTransport};

type TransportResult<T> = std::result::Result<T, TransportError>;

/// Interactive PTY shell on a switch, driven by prompt detection.
pub struct SshChannel {
    config: SshConfig,

    /// Matches any CLI prompt of the platform (exec or config mode).
    prompt: Regex,

    /// Sent right after login, e.g. `terminal length 0`.
    on_open_commands: Vec<String>,

    transport: Option<SshTransport>,
    channel: Option<Channel<Msg>>,
    buffer: PatternBuffer,
}

impl SshChannel {
    /// Create an unopened channel.
    pub fn new(config: SshConfig, prompt: Regex, on_open_commands: Vec<String>) -> Self {
        Self {
            config,
            prompt,
            on_open_commands,
            transport: None,
            channel: None,
            buffer: PatternBuffer::default(),
        }
    }

    /// The SSH configuration this channel connects with.
    pub fn config(&self) -> &SshConfig {
        &self.config
    }

    async fn write_line(&mut self, line: &str) -> TransportResult<()> {
        let channel = self.channel.as_mut().ok_or(TransportError::Disconnected)?;
        let data = format!("{line}\n");
        channel.data(data.as_bytes()).await?;
        Ok(())
    }

    /// Read until `pattern` matches at the end of the buffer.
    ///
    /// Returns `(output, matched)`; the buffer is empty afterwards.
    async fn read_until(
        &mut self,
        pattern: Option<&Regex>,
        timeout: Duration,
    ) -> TransportResult<(Vec<u8>, Vec<u8>)> {
        let pattern = pattern.unwrap_or(&self.prompt);
        let deadline = Instant::now() + timeout;
        let channel = self.channel.as_mut().ok_or(TransportError::Disconnected)?;

        loop {
            if let Some(offset) = self.buffer.find_trailing(pattern) {
                return Ok(self.buffer.take_split(offset));
            }

            let msg = tokio::time::timeout_at(deadline, channel.wait())
                .await
                .map_err(|_| TransportError::Timeout(timeout))?;

            match msg {
                Some(ChannelMsg::Data { ref data }) => {
                    trace!("read {} bytes", data.len());
                    self.buffer.extend(data);
                }
                Some(ChannelMsg::ExtendedData { ref data, .. }) => {
                    self.buffer.extend(data);
                }
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                    return Err(TransportError::Disconnected);
                }
                Some(_) => {}
            }
        }
    }
}

impl RemoteChannel for SshChannel {
    async fn open(&mut self) -> TransportResult<()> {
        if self.transport.is_some() || self.channel.is_some() {
            debug!("{}: releasing previous connection", self.config.host);
            if let Err(e) = self.close().await {
                debug!("{}: ignoring close error: {}", self.config.host, e);
            }
        }

        let transport = SshTransport::connect(&self.config).await?;
        let channel = transport.open_shell(&self.config).await?;
        self.transport = Some(transport);
        self.channel = Some(channel);
        self.buffer.clear();

        let (_, prompt) = self.read_until(None, self.config.timeout).await?;
        debug!(
            "{}: logged in, prompt {:?}",
            self.config.host,
            String::from_utf8_lossy(&prompt).trim()
        );

        for command in self.on_open_commands.clone() {
            self.send_command(&command).await?;
        }
        Ok(())
    }

    async fn send_command(&mut self, command: &str) -> TransportResult<String> {
        self.write_line(command).await?;
        let (output, _) = self.read_until(None, self.config.timeout).await?;
        Ok(normalize_output(&output, command))
    }

    async fn send_interactive(&mut self, events: &[InteractiveEvent]) -> TransportResult<String> {
        let mut combined = String::new();

        for event in events {
            self.write_line(&event.input).await?;

            if event.pattern.is_none() {
                continue;
            }

            let timeout = event.timeout.unwrap_or(self.config.timeout);
            let (mut output, matched) = self.read_until(event.pattern.as_ref(), timeout).await?;
            output.extend_from_slice(&matched);
            combined.push_str(&normalize_output(&output, &event.input));
            combined.push('\n');
        }

        Ok(combined)
    }

    async fn close(&mut self) -> TransportResult<()> {
        if let Some(channel) = self.channel.take() {
            // The device may already have dropped the shell.
            let _ = channel.eof().await;
        }
        if let Some(transport) = self.transport.take() {
            if !transport.is_closed() {
                transport.close().await?;
            }
        }
        self.buffer.clear();
        Ok(())
    }
}

/// Strip the command echo and normalize line endings.
///
/// The trailing prompt has already been split off by the reader; the
/// newline that preceded it goes too, so the text ends with the last line
/// the device printed.
fn normalize_output(raw: &[u8], command: &str) -> String {
    let text = String::from_utf8_lossy(raw).replace("\r\n", "\n").replace('\r', "");

    let body = match text.split_once('\n') {
        Some((first, rest)) if first.trim_end().ends_with(command.trim()) => rest,
        None if text.trim_end().ends_with(command.trim()) => "",
        _ => text.as_str(),
    };

    body.strip_suffix('\n').unwrap_or(body).to_string()
}
