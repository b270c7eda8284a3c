//! Centralized error types for the gateway process
//!
//! Process-level failures (binding, config, files) are represented by the
//! `GatewayError` enum. Telegram decoding has its own error type in
//! [`crate::telegram::DecodeError`], since those failures are local to a frame
//! and never stop the process.
//!
//! Use `Result<T>` as shorthand for `std::result::Result<T, GatewayError>`.

use crate::telegram::FormatError;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// All gateway errors
#[derive(Debug)]
pub enum GatewayError {
    // === Network ===
    /// Failed to bind the TCP listener
    TcpBind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    /// Failed to connect to a gateway (synthetic client)
    Connect {
        addr: String,
        source: std::io::Error,
    },

    // === IO ===
    /// File system operation failed
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // === Config ===
    /// Config file is not valid TOML or has wrong types
    ConfigParse { path: PathBuf, reason: String },
    /// Invalid config value
    ConfigValidation { field: &'static str, reason: String },

    // === Telegrams ===
    /// Synthetic reading could not be encoded
    Encode(FormatError),

    // === Runtime ===
    /// Tokio runtime creation failed
    Runtime { source: std::io::Error },
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TcpBind { source, .. }
            | Self::Connect { source, .. }
            | Self::Io { source, .. }
            | Self::Runtime { source } => Some(source),
            Self::Encode(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TcpBind { addr, .. } => write!(f, "Cannot bind TCP listener on {}", addr),
            Self::Connect { addr, .. } => write!(f, "Cannot connect to {}", addr),
            Self::Io { path, .. } => write!(f, "IO error: {}", path.display()),
            Self::ConfigParse { path, reason } => {
                write!(f, "Invalid config file {}: {}", path.display(), reason)
            }
            Self::ConfigValidation { field, reason } => {
                write!(f, "Invalid {}: {}", field, reason)
            }
            Self::Encode(_) => write!(f, "Cannot encode telegram"),
            Self::Runtime { .. } => write!(f, "Failed to create runtime"),
        }
    }
}

impl From<FormatError> for GatewayError {
    fn from(e: FormatError) -> Self {
        Self::Encode(e)
    }
}

/// Alias for Result with GatewayError
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_config_validation() {
        let err = GatewayError::ConfigValidation {
            field: "server.listen",
            reason: "not a socket address".into(),
        };
        assert_eq!(err.to_string(), "Invalid server.listen: not a socket address");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_source_chain_for_io() {
        let err = GatewayError::Io {
            path: PathBuf::from("readings.jsonl"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "IO error: readings.jsonl");
        assert_eq!(err.source().map(|s| s.to_string()), Some("denied".to_string()));
    }
}
