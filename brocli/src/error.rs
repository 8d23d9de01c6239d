//! Error types for brocli.
//!
//! Transport problems, device-side rejections and parse failures are
//! distinct variants so callers can tell a recoverable rejection from a
//! dead session without inspecting message text.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::driver::{ConfigState, SessionState};

/// Main error type for brocli operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The session could not be opened or was lost mid-command.
    #[error(transparent)]
    Connection(#[from] ConnectionFailure),

    /// The device CLI answered with its "invalid input" marker.
    #[error("Command rejected by device: {command:?}")]
    CommandRejected { command: String, output: String },

    /// Output did not have the shape expected for the requested table.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Session state does not allow the operation.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Configuration lifecycle precondition not met.
    #[error("Config lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// A multi-step configuration workflow stopped part way through.
    #[error("{operation} failed at {failed:?} after {} completed step(s): {source}", .completed.len())]
    Workflow {
        operation: &'static str,
        completed: Vec<String>,
        failed: String,
        #[source]
        source: Box<Error>,
    },

    /// A local file could not be staged on the relay host.
    #[error("Failed to stage {} for transfer: {source}", .path.display())]
    Relay {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed caller input.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Configuration file errors.
    #[error("Config file error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Whether this error (or the step that caused it) means the session is gone.
    pub fn is_connection_failure(&self) -> bool {
        match self {
            Error::Connection(_) => true,
            Error::Workflow { source, .. } => source.is_connection_failure(),
            _ => false,
        }
    }

    /// Whether this error is a device-side rejection.
    pub fn is_rejection(&self) -> bool {
        match self {
            Error::CommandRejected { .. } => true,
            Error::Workflow { source, .. } => source.is_rejection(),
            _ => false,
        }
    }
}

/// A transport failure bound to the device it happened on.
#[derive(Error, Debug)]
#[error("Connection to {host}:{port} failed: {cause}")]
pub struct ConnectionFailure {
    pub host: String,
    pub port: u16,
    #[source]
    pub cause: TransportError,
}

/// Transport layer errors (SSH connection, authentication, PTY I/O).
#[derive(Error, Debug)]
pub enum TransportError {
    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Host key not present in known_hosts (strict mode)
    #[error("Host key for {host}:{port} is not in known_hosts")]
    HostKeyUnknown { host: String, port: u16 },

    /// Host key differs from the one recorded in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// PTY or shell request refused by the server
    #[error("Failed to set up interactive shell: {0}")]
    PtyRequest(String),

    /// Connection was closed unexpectedly
    #[error("Connection disconnected")]
    Disconnected,

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Table output did not match the expected layout.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A row had a token count outside the recognized set.
    #[error("Unexpected row shape (expected {expected} tokens): {line:?}")]
    UnexpectedShape { line: String, expected: String },

    /// A field could not be converted and has no sensible default.
    #[error("Invalid {field} value {value:?} in row {line:?}")]
    InvalidField {
        field: &'static str,
        value: String,
        line: String,
    },

    /// Two rows produced the same key in a keyed table.
    #[error("Duplicate key {key:?} in table")]
    DuplicateKey { key: String },
}

/// Session lifecycle errors.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Command attempted while the session is not open
    #[error("Session is {state:?} - call open() first")]
    NotOpen { state: SessionState },

    /// open() called on an open session
    #[error("Session already open")]
    AlreadyOpen,
}

/// Configuration lifecycle errors.
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// Operation not valid from the current staging state
    #[error("Cannot {operation} while candidate is {state:?}")]
    InvalidTransition {
        operation: &'static str,
        state: ConfigState,
    },

    /// Operation needs a running-config checkpoint
    #[error("No running-config checkpoint has been taken")]
    NoRunningCheckpoint,

    /// Operation needs a staged candidate
    #[error("No candidate configuration is staged")]
    NoCandidate,

    /// Candidate load requested without a relay host
    #[error("No relay host configured for candidate transfer")]
    NoRelay,
}

/// Configuration file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// TOML syntax or schema error
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// Semantically invalid value
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
}

/// Result type alias using brocli's Error.
pub type Result<T> = std::result::Result<T, Error>;
