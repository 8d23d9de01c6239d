//! Session manager and command executor.

use std::future::Future;
use std::time::Duration;

use indexmap::IndexMap;
use log::{debug, trace, warn};
use serde::Serialize;

use crate::channel::{InteractiveEvent, RemoteChannel};
use crate::error::{ConnectionFailure, Error, Result, SessionError, TransportError};

/// Lifecycle of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    /// Never opened, or closed by the caller.
    Closed,
    /// Commands may be sent.
    Open,
    /// The transport failed; the session must be reopened.
    Failed,
}

/// One device session: owns the channel, serializes commands and turns
/// device output into either text or a typed failure.
///
/// Commands take `&mut self`, so at most one is ever in flight. Every
/// channel call is bounded by the session timeout; a timeout is reported as
/// a connection failure and leaves the session [`SessionState::Failed`].
pub struct Session<C> {
    channel: C,
    host: String,
    port: u16,
    timeout: Duration,
    failed_when_contains: Vec<String>,
    state: SessionState,
}

impl<C: RemoteChannel> Session<C> {
    pub fn new(
        channel: C,
        host: impl Into<String>,
        port: u16,
        timeout: Duration,
        failed_when_contains: Vec<String>,
    ) -> Self {
        Self {
            channel,
            host: host.into(),
            port,
            timeout,
            failed_when_contains,
            state: SessionState::Closed,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[cfg(test)]
    pub(crate) fn channel(&self) -> &C {
        &self.channel
    }

    /// Open the channel.
    ///
    /// No retry is attempted. On failure the session is left `Failed`.
    /// Reopening a failed session releases the old connection first.
    pub async fn open(&mut self) -> Result<()> {
        if self.is_open() {
            return Err(SessionError::AlreadyOpen.into());
        }

        if self.state == SessionState::Failed {
            if let Err(e) = bounded(self.timeout, self.channel.close()).await {
                debug!("Ignoring close error on failed session: {}", e);
            }
        }

        debug!("Opening session to {}:{}", self.host, self.port);
        match bounded(self.timeout, self.channel.open()).await {
            Ok(()) => {
                self.state = SessionState::Open;
                debug!("Session to {} open", self.host);
                Ok(())
            }
            Err(cause) => Err(self.fail(cause)),
        }
    }

    /// Close the channel. Closing a closed session does nothing.
    pub async fn close(&mut self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }

        debug!("Closing session to {}", self.host);
        let result = bounded(self.timeout, self.channel.close()).await;
        self.state = SessionState::Closed;
        result.map_err(|cause| self.connection_failure(cause).into())
    }

    /// Send one command and return its output.
    ///
    /// Output containing one of the platform's failure markers is returned
    /// as [`Error::CommandRejected`], never as data.
    pub async fn execute(&mut self, command: &str) -> Result<String> {
        self.execute_as(command, command).await
    }

    /// Like [`execute`](Self::execute), but logs and reports `shown` in
    /// place of the command text, which may carry credentials.
    pub(crate) async fn execute_as(&mut self, command: &str, shown: &str) -> Result<String> {
        self.ensure_open()?;
        if command.trim().is_empty() {
            return Err(Error::InvalidArgument {
                message: "command text is empty".to_string(),
            });
        }

        debug!("Sending command: {:?}", shown);
        let output = match bounded(self.timeout, self.channel.send_command(command)).await {
            Ok(output) => output,
            Err(cause) => return Err(self.fail(cause)),
        };
        trace!("{:?} returned {} bytes", shown, output.len());

        if let Some(marker) = self.rejection_marker(&output) {
            debug!("Command {:?} rejected: {:?}", shown, marker);
            return Err(Error::CommandRejected {
                command: shown.to_string(),
                output,
            });
        }
        Ok(output)
    }

    /// Send commands in order, keyed by command text.
    ///
    /// The first rejection or transport failure aborts the remaining
    /// commands. A command listed twice keeps its first position and its
    /// last output.
    pub async fn execute_all<S: AsRef<str>>(
        &mut self,
        commands: &[S],
    ) -> Result<IndexMap<String, String>> {
        let mut outputs = IndexMap::with_capacity(commands.len());
        for command in commands {
            let command = command.as_ref();
            let output = self.execute(command).await?;
            outputs.insert(command.to_string(), output);
        }
        Ok(outputs)
    }

    /// Run an interactive exchange such as a confirmation prompt.
    ///
    /// Rejections are detected the same way as for [`execute`](Self::execute)
    /// and reported against the first input of the exchange.
    pub async fn execute_interactive(&mut self, events: &[InteractiveEvent]) -> Result<String> {
        self.ensure_open()?;
        for event in events {
            debug!("Sending interactive input: {:?}", event.input);
        }
        let output = match bounded(self.timeout, self.channel.send_interactive(events)).await {
            Ok(output) => output,
            Err(cause) => return Err(self.fail(cause)),
        };

        if let Some(marker) = self.rejection_marker(&output) {
            let command = events.first().map(|e| e.input.clone()).unwrap_or_default();
            debug!("Interactive {:?} rejected: {:?}", command, marker);
            return Err(Error::CommandRejected { command, output });
        }
        Ok(output)
    }

    /// Mark the session closed without talking to the device.
    ///
    /// Used once the device has dropped the connection on purpose.
    pub(crate) async fn abandon(&mut self) {
        if let Err(e) = bounded(self.timeout, self.channel.close()).await {
            debug!("Ignoring close error on abandoned session: {}", e);
        }
        self.state = SessionState::Closed;
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(SessionError::NotOpen { state: self.state }.into())
        }
    }

    fn rejection_marker(&self, output: &str) -> Option<&str> {
        self.failed_when_contains
            .iter()
            .find(|marker| output.contains(marker.as_str()))
            .map(String::as_str)
    }

    fn connection_failure(&self, cause: TransportError) -> ConnectionFailure {
        ConnectionFailure {
            host: self.host.clone(),
            port: self.port,
            cause,
        }
    }

    fn fail(&mut self, cause: TransportError) -> Error {
        if self.state != SessionState::Failed {
            debug!("Session to {} failed: {}", self.host, cause);
        }
        self.state = SessionState::Failed;
        self.connection_failure(cause).into()
    }
}

impl<C> Drop for Session<C> {
    fn drop(&mut self) {
        if self.state == SessionState::Open {
            warn!("Session to {} dropped while open; call close()", self.host);
        }
    }
}

async fn bounded<T>(
    timeout: Duration,
    future: impl Future<Output = std::result::Result<T, TransportError>>,
) -> std::result::Result<T, TransportError> {
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout(timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::mock::ScriptedChannel;
    use tokio_test::{assert_err, assert_ok};

    fn session(channel: ScriptedChannel) -> Session<ScriptedChannel> {
        Session::new(
            channel,
            "sw0",
            22,
            Duration::from_secs(5),
            vec!["Invalid input detected".to_string()],
        )
    }

    #[tokio::test]
    async fn test_open_and_close() {
        let mut session = session(ScriptedChannel::new());
        assert_eq!(session.state(), SessionState::Closed);

        assert_ok!(session.open().await);
        assert!(session.is_open());

        assert_ok!(session.close().await);
        assert_ok!(session.close().await);
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(session.channel().closed, 1);
    }

    #[tokio::test]
    async fn test_open_twice_fails() {
        let mut session = session(ScriptedChannel::new());
        session.open().await.unwrap();
        let err = session.open().await.unwrap_err();
        assert!(matches!(err, Error::Session(SessionError::AlreadyOpen)));
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_host_is_connection_failure() {
        let mut session = session(ScriptedChannel::unreachable());
        let err = session.open().await.unwrap_err();

        match err {
            Error::Connection(ConnectionFailure { host, port, cause }) => {
                assert_eq!(host, "sw0");
                assert_eq!(port, 22);
                assert!(matches!(cause, TransportError::Io(_)));
            }
            other => panic!("expected connection failure, got {other:?}"),
        }
        assert_eq!(session.state(), SessionState::Failed);
        assert!(!session.is_open());
    }

    #[tokio::test]
    async fn test_execute_requires_open_session() {
        let mut session = session(ScriptedChannel::new());
        let err = session.execute("show version").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Session(SessionError::NotOpen {
                state: SessionState::Closed
            })
        ));
        assert!(session.channel().sent.is_empty());
    }

    #[tokio::test]
    async fn test_execute_returns_output() {
        let channel = ScriptedChannel::new().reply("show clock", "2024-03-01 10:00:00");
        let mut session = session(channel);
        session.open().await.unwrap();

        let output = session.execute("show clock").await.unwrap();
        assert_eq!(output, "2024-03-01 10:00:00");
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_command_is_invalid_argument() {
        let mut session = session(ScriptedChannel::new());
        session.open().await.unwrap();
        let err = session.execute("   ").await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_rejection_is_not_returned_as_data() {
        let channel = ScriptedChannel::new().reply(
            "show foo",
            "              ^\n% Invalid input detected at '^' marker.",
        );
        let mut session = session(channel);
        session.open().await.unwrap();

        let err = session.execute("show foo").await.unwrap_err();
        assert!(err.is_rejection());
        match err {
            Error::CommandRejected { command, output } => {
                assert_eq!(command, "show foo");
                assert!(output.contains("Invalid input detected"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        // A rejection does not kill the session.
        assert!(session.is_open());
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_execute_all_preserves_order() {
        let channel = ScriptedChannel::new()
            .reply("show version", "NOS 7.2.0a")
            .reply("show clock", "10:00");
        let mut session = session(channel);
        session.open().await.unwrap();

        let outputs = session
            .execute_all(&["show version", "show clock"])
            .await
            .unwrap();
        let keys: Vec<&str> = outputs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["show version", "show clock"]);
        assert_eq!(outputs["show clock"], "10:00");
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_rejection_aborts_batch() {
        let channel = ScriptedChannel::new()
            .reply("show version", "NOS 7.2.0a")
            .reply("show bogus", "% Invalid input detected at '^' marker.")
            .reply("show clock", "10:00");
        let mut session = session(channel);
        session.open().await.unwrap();

        let err = assert_err!(
            session
                .execute_all(&["show version", "show bogus", "show clock"])
                .await
        );
        assert!(err.is_rejection());
        assert_eq!(session.channel().sent, vec!["show version", "show bogus"]);
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_transport_error_fails_session() {
        let channel = ScriptedChannel::new().disconnect_on("show tech-support");
        let mut session = session(channel);
        session.open().await.unwrap();

        let err = session.execute("show tech-support").await.unwrap_err();
        assert!(err.is_connection_failure());
        assert_eq!(session.state(), SessionState::Failed);

        let err = session.execute("show clock").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Session(SessionError::NotOpen {
                state: SessionState::Failed
            })
        ));
    }

    #[tokio::test]
    async fn test_reopen_after_failure() {
        let channel = ScriptedChannel::new().disconnect_on("show tech-support");
        let mut session = session(channel);
        session.open().await.unwrap();
        let _ = session.execute("show tech-support").await;
        assert_eq!(session.channel().closed, 0);

        assert_ok!(session.open().await);
        assert_eq!(session.channel().opened, 2);
        // The dead connection is released before reconnecting.
        assert_eq!(session.channel().closed, 1);
        session.close().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fails_session() {
        let channel = ScriptedChannel::new().hang_on("show running-config");
        let mut session = session(channel);
        session.open().await.unwrap();

        let err = session.execute("show running-config").await.unwrap_err();
        match err {
            Error::Connection(ConnectionFailure {
                cause: TransportError::Timeout(elapsed),
                ..
            }) => assert_eq!(elapsed, Duration::from_secs(5)),
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(session.state(), SessionState::Failed);

        let err = session.execute("show clock").await.unwrap_err();
        assert!(matches!(err, Error::Session(SessionError::NotOpen { .. })));
    }
}
