//! Error types for telnetlab.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for telnetlab operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Telnet transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Driver-level errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Testbed loading and validation errors
    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    /// Operator input errors
    #[error("Menu error: {0}")]
    Menu(#[from] MenuError),

    /// Writing an extracted configuration failed
    #[error("Failed to write configuration dump to {path}: {source}")]
    Extract {
        path: std::path::PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Transport layer errors (TCP connection, Telnet stream).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// Connection was closed by the remote end
    #[error("Connection disconnected")]
    Disconnected,

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Channel layer errors (pattern matching on device output).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// None of the expected patterns appeared in time
    #[error("Pattern {patterns:?} not found within {timeout:?} (last output: {tail:?})")]
    PromptTimeout {
        patterns: Vec<String>,
        timeout: Duration,
        tail: String,
    },

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Driver layer errors (sessions and command scripts).
#[derive(Error, Debug)]
pub enum DriverError {
    /// Session not connected
    #[error("Session not connected - call open() first")]
    NotConnected,

    /// Session already connected
    #[error("Session already connected")]
    AlreadyConnected,

    /// A script step did not reach its expected prompt
    #[error("Step {index} ('{command}') failed: {source}")]
    StepFailed {
        index: usize,
        command: String,
        #[source]
        source: Box<Error>,
    },

    /// A step kept answering interactive questions without reaching its prompt
    #[error("Answered {limit} interactive questions without reaching the expected prompt")]
    TooManyReplies { limit: usize },

    /// Invalid configuration in the session builder or script
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// No configurer exists for this kind of device
    #[error("Device '{device}' of type {kind} is not supported")]
    UnsupportedDevice { device: String, kind: String },

    /// Device has no Telnet endpoint
    #[error("Device '{device}' has no telnet connection")]
    NoEndpoint { device: String },
}

/// Testbed loading and validation errors.
#[derive(Error, Debug)]
pub enum TopologyError {
    /// Testbed file could not be read
    #[error("Failed to read testbed {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: io::Error,
    },

    /// Testbed is not valid YAML or does not match the schema
    #[error("Failed to parse testbed: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A required field is absent for this device kind
    #[error("Device '{device}' is missing required field '{field}'")]
    MissingField { device: String, field: &'static str },

    /// An address could not be parsed
    #[error("Invalid address '{value}' on {context}: {reason}")]
    InvalidAddress {
        context: String,
        value: String,
        reason: String,
    },

    /// An interface declares both access and trunk switchport settings
    #[error("Interface '{interface}' on '{device}' declares both access and trunk settings")]
    ConflictingSwitchport { device: String, interface: String },

    /// A switchport mode is declared without its VLANs
    #[error("Interface '{interface}' on '{device}' is in {mode} mode without VLANs")]
    IncompleteSwitchport {
        device: String,
        interface: String,
        mode: &'static str,
    },

    /// The topology section names a device not declared under `devices`
    #[error("Topology references unknown device '{device}'")]
    UnknownInterfaceOwner { device: String },
}

/// Operator menu errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MenuError {
    /// Input is not one of the listed options
    #[error("Option not valid: '{input}' ({reason})")]
    InvalidSelection { input: String, reason: String },
}

/// Result type alias using telnetlab's Error.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True when this error (or the step failure wrapping it) is a prompt timeout.
    pub fn is_prompt_timeout(&self) -> bool {
        match self {
            Error::Channel(ChannelError::PromptTimeout { .. }) => true,
            Error::Driver(DriverError::StepFailed { source, .. }) => source.is_prompt_timeout(),
            _ => false,
        }
    }

    /// True when this error is a failure to reach the endpoint.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Error::Transport(TransportError::ConnectionFailed { .. } | TransportError::Timeout(_))
        )
    }
}
