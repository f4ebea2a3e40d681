// crates/core/src/error.rs

//! Error types for registration, dispatch and command execution.

use std::io;

use thiserror::Error;

/// Registration contract violations. These are fatal at startup.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("command name must not be empty")]
    EmptyName,

    #[error("schema name '{schema}' does not match registration name '{name}'")]
    NameMismatch { name: String, schema: String },

    #[error("command '{0}' is already registered")]
    Duplicate(String),

    #[error("malformed schema: {0}")]
    MalformedSchema(String),
}

/// Failure to route a call to a command.
///
/// Kept apart from [`CommandError`]: an unknown tool name is a caller mistake,
/// while a command that ran and failed reports through its own payload.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown command '{0}'")]
    NotFound(String),

    #[error("command '{name}' panicked: {message}")]
    Panicked { name: String, message: String },
}

/// Closed set of expected command failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("remote API returned HTTP {status}: {body}")]
    RemoteApi { status: u16, body: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("I/O error: {0}")]
    Io(String),

    /// A credential, binary or platform feature the command needs is missing.
    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl CommandError {
    /// Machine-readable tag carried in the `error_kind` field of a payload.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::NotFound(_) => "not_found",
            CommandError::PermissionDenied(_) => "permission_denied",
            CommandError::Timeout(_) => "timeout",
            CommandError::RemoteApi { .. } => "remote_api_error",
            CommandError::InvalidArgument(_) => "invalid_argument",
            CommandError::Network(_) => "network_error",
            CommandError::Io(_) => "io_error",
            CommandError::Unavailable(_) => "unavailable",
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        CommandError::InvalidArgument(msg.into())
    }

    /// Attach the offending path to an I/O failure.
    pub fn from_io(err: io::Error, path: impl AsRef<std::path::Path>) -> Self {
        let detail = format!("{}: {}", path.as_ref().display(), err);
        match err.kind() {
            io::ErrorKind::NotFound => CommandError::NotFound(detail),
            io::ErrorKind::PermissionDenied => CommandError::PermissionDenied(detail),
            io::ErrorKind::TimedOut => CommandError::Timeout(detail),
            io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => {
                CommandError::InvalidArgument(detail)
            }
            _ => CommandError::Io(detail),
        }
    }
}

impl From<io::Error> for CommandError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => CommandError::NotFound(err.to_string()),
            io::ErrorKind::PermissionDenied => CommandError::PermissionDenied(err.to_string()),
            io::ErrorKind::TimedOut => CommandError::Timeout(err.to_string()),
            _ => CommandError::Io(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for CommandError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CommandError::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            CommandError::RemoteApi {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else if err.is_decode() {
            CommandError::InvalidArgument(format!("malformed response: {}", err))
        } else {
            CommandError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        CommandError::InvalidArgument(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_kinds_map_to_variants() {
        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(CommandError::from(missing).kind(), "not_found");

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(
            CommandError::from_io(denied, "/etc/shadow"),
            CommandError::PermissionDenied("/etc/shadow: nope".to_string())
        );

        let other = io::Error::new(io::ErrorKind::Other, "weird");
        assert_eq!(CommandError::from(other).kind(), "io_error");
    }

    #[test]
    fn test_remote_api_display() {
        let err = CommandError::RemoteApi {
            status: 404,
            body: "Not Found".into(),
        };
        assert_eq!(err.to_string(), "remote API returned HTTP 404: Not Found");
        assert_eq!(err.kind(), "remote_api_error");
    }
}
