use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// All error types that can occur when talking to WiZ bulbs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The command could not be composed into a valid request; nothing was sent.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// No reply arrived from the device within the timeout.
    #[error("device at {addr} did not reply within {timeout:?}")]
    DeviceUnreachable { addr: SocketAddr, timeout: Duration },

    /// A reply arrived but could not be understood.
    #[error("device protocol error: {0}")]
    DeviceProtocolError(String),

    /// The scene name or id is not part of the scene table.
    #[error("unknown scene: {0}")]
    UnknownScene(String),

    /// The discovery probe could not be broadcast.
    #[error("discovery failed during {action}: {err}")]
    DiscoveryFailed { action: String, err: std::io::Error },

    /// Failed to serialize a request to JSON.
    #[error("failed to dump json: {0:?}")]
    JsonDump(serde_json::Error),

    /// A network socket operation failed while communicating with a bulb.
    #[error("socket {action} error: {err:?}")]
    Socket { action: String, err: std::io::Error },

    /// Reading or writing the preference file failed.
    #[error("preferences at {path:?}: {reason}")]
    Preferences { path: PathBuf, reason: String },

    /// Failed to parse a [`crate::Color`] from a string.
    #[error("invalid color string: {0}")]
    InvalidColorString(String),

    /// A numeric value is outside the range accepted by its type.
    #[error("{kind} value {value} is out of range")]
    InvalidValue { kind: &'static str, value: u32 },
}

impl Error {
    pub fn invalid_command(reason: &str) -> Self {
        Error::InvalidCommand(reason.to_string())
    }

    pub fn protocol(reason: impl std::fmt::Display) -> Self {
        Error::DeviceProtocolError(reason.to_string())
    }

    /// Create a new socket error
    pub fn socket(action: &str, err: std::io::Error) -> Self {
        Error::Socket {
            action: action.to_string(),
            err,
        }
    }

    pub fn discovery(action: &str, err: std::io::Error) -> Self {
        Error::DiscoveryFailed {
            action: action.to_string(),
            err,
        }
    }

    pub fn unknown_scene_id(id: u16) -> Self {
        Error::UnknownScene(format!("id {id}"))
    }

    pub fn preferences(path: &Path, reason: impl std::fmt::Display) -> Self {
        Error::Preferences {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_value(kind: &'static str, value: impl Into<u32>) -> Self {
        Error::InvalidValue {
            kind,
            value: value.into(),
        }
    }

    /// Whether the failure is transient and worth retrying at the caller level.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::DeviceUnreachable { .. })
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
