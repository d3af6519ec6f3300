//! Error types for the router deployment tool.
//!
//! This module provides the error hierarchy for every stage of a deployment:
//! settings, the device session, reply parsing, device-reported RPC errors,
//! and the lock lifecycle.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the router deployment tool.
#[derive(Debug, Error)]
pub enum RcliError {
    /// Settings-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Device session and transport errors.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// A device reply could not be parsed.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// The device answered with a structured RPC error.
    #[error("{0}")]
    Rpc(#[from] RpcError),

    /// The workflow failed and releasing the lock failed as well.
    #[error("{action}; additionally failed to unlock configuration: {unlock}")]
    LockReleaseFailed {
        /// Failure raised while the lock was held.
        action: Box<RcliError>,
        /// Failure raised by the unlock request.
        unlock: Box<RcliError>,
    },

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Settings-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file was not found.
    #[error("Settings file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The settings file could not be parsed.
    #[error("Failed to parse settings: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Settings validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// An environment override held a value of the wrong shape.
    #[error("Invalid value for {name}: {value}")]
    InvalidEnvVar {
        /// Name of the variable.
        name: String,
        /// The rejected value.
        value: String,
    },

    /// No management user could be resolved.
    #[error("No management user given (use --user, the settings file, or $USER)")]
    MissingUser,
}

/// Device session and transport errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The transport could not be established.
    #[error("Failed to connect to {router}: {message}")]
    ConnectFailed {
        /// Router address.
        router: String,
        /// Description of the failure.
        message: String,
    },

    /// The transport broke during an exchange.
    #[error("Transport failure: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },

    /// The device refused the configuration lock.
    #[error("Failed to lock configuration: {message}")]
    LockConflict {
        /// Reason reported by the device.
        message: String,
    },

    /// The session was used after it was closed.
    #[error("Session is closed")]
    Closed,
}

/// The reply parsing stage that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    /// The NETCONF `rpc-reply` envelope.
    Envelope,
    /// A configuration diff reply.
    Diff,
    /// A load-configuration result.
    LoadResult,
    /// The software version reply.
    Version,
    /// An operational command reply.
    CommandOutput,
    /// A running configuration reply.
    Configuration,
    /// A commit result.
    Commit,
}

impl fmt::Display for ParseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Envelope => "rpc reply",
            Self::Diff => "configuration diff",
            Self::LoadResult => "load result",
            Self::Version => "software version",
            Self::CommandOutput => "command output",
            Self::Configuration => "configuration",
            Self::Commit => "commit result",
        };
        write!(f, "{s}")
    }
}

/// A device reply could not be parsed.
#[derive(Debug, Error)]
#[error("failed to parse {stage}: {message}")]
pub struct ParseError {
    /// Which parse stage failed.
    pub stage: ParseStage,
    /// Description of the failure.
    pub message: String,
}

/// A structured error reported by the device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("RPC error: {message}{}", bad_element_suffix(.bad_element))]
pub struct RpcError {
    /// Error severity (`error`, `warning`).
    pub severity: String,
    /// Configuration path the error refers to.
    pub path: String,
    /// Human readable message.
    pub message: String,
    /// The offending element, if any.
    pub bad_element: String,
}

fn bad_element_suffix(bad_element: &str) -> String {
    if bad_element.is_empty() {
        String::new()
    } else {
        format!(" (bad element: {bad_element})")
    }
}

/// Result type alias for router deployment operations.
pub type Result<T> = std::result::Result<T, RcliError>;

impl RcliError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl SessionError {
    /// Creates a transport error with the given message.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

impl ParseError {
    /// Creates a parse error for the given stage.
    #[must_use]
    pub fn new(stage: ParseStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}
