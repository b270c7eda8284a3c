//! Configuration management
//!
//! Config is read from an explicit path, or from `telegram-gateway.toml` in
//! the working directory. Every section is optional; missing fields use
//! defaults.

use crate::codec::{ChecksumMode, ScaledIntMode};
use crate::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_JSONL_PATH, DEFAULT_LISTEN_ADDR,
    DEFAULT_READ_BUFFER_SIZE,
};
use crate::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

// =============================================================================
// Application Configuration
// =============================================================================

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub decoder: DecoderConfig,
    pub sink: SinkConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address terminals connect to
    pub listen: String,
    /// Seconds without data before a connection is closed
    pub idle_timeout_secs: u64,
    /// Maximum bytes per socket read
    pub read_buffer_size: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Checksum algorithm, or `off`
    pub checksum: ChecksumMode,
    /// Treatment of digit-pair bytes above 99
    pub scaled_int: ScaledIntMode,
}

// =============================================================================
// Sink Configuration
// =============================================================================

/// Where decoded readings go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Log each reading (no storage)
    #[default]
    Log,
    /// Append JSON lines to `path`
    Jsonl,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub kind: SinkKind,
    /// Output file for the jsonl sink
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN_ADDR.to_string(),
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::Log,
            path: PathBuf::from(DEFAULT_JSONL_PATH),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Parsed listen address
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| GatewayError::ConfigValidation {
                field: "server.listen",
                reason: format!("'{}': {}", self.listen, e),
            })
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Config {
    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        self.server.listen_addr()?;
        if self.server.idle_timeout_secs == 0 {
            return Err(GatewayError::ConfigValidation {
                field: "server.idle_timeout_secs",
                reason: "must be at least 1".into(),
            });
        }
        if self.server.read_buffer_size == 0 {
            return Err(GatewayError::ConfigValidation {
                field: "server.read_buffer_size",
                reason: "must be at least 1".into(),
            });
        }
        if self.sink.kind == SinkKind::Jsonl && self.sink.path.as_os_str().is_empty() {
            return Err(GatewayError::ConfigValidation {
                field: "sink.path",
                reason: "required for the jsonl sink".into(),
            });
        }
        Ok(())
    }
}

/// Parse config from TOML text
pub fn parse(content: &str, path: &Path) -> Result<Config> {
    toml::from_str(content).map_err(|e| GatewayError::ConfigParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Load config
///
/// An explicit path must exist. Without one, the default file in the working
/// directory is used when present, otherwise built-in defaults.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                return Ok(Config::default());
            }
            default
        }
    };

    let content = fs::read_to_string(&path).map_err(|e| GatewayError::Io {
        path: path.clone(),
        source: e,
    })?;
    let config = parse(&content, &path)?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(s: &str) -> Result<Config> {
        parse(s, Path::new("test.toml"))
    }

    #[test]
    fn test_config_empty_file() {
        let config = parse_str("").unwrap();

        assert_eq!(config.server.listen, DEFAULT_LISTEN_ADDR);
        assert_eq!(config.server.idle_timeout_secs, 10);
        assert_eq!(config.server.read_buffer_size, 1024);
        assert_eq!(config.decoder.checksum, ChecksumMode::Sum);
        assert_eq!(config.decoder.scaled_int, ScaledIntMode::Permissive);
        assert_eq!(config.sink.kind, SinkKind::Log);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_partial_sections() {
        let config = parse_str(
            r#"
[decoder]
checksum = "off"
scaled_int = "strict"

[sink]
kind = "jsonl"
path = "/var/lib/gateway/readings.jsonl"
"#,
        )
        .unwrap();

        assert_eq!(config.decoder.checksum, ChecksumMode::Off);
        assert_eq!(config.decoder.scaled_int, ScaledIntMode::Strict);
        assert_eq!(config.sink.kind, SinkKind::Jsonl);
        assert_eq!(
            config.sink.path,
            PathBuf::from("/var/lib/gateway/readings.jsonl")
        );
        // Rest should be defaults
        assert_eq!(config.server.listen, DEFAULT_LISTEN_ADDR);
    }

    #[test]
    fn test_config_rejects_unknown_checksum() {
        let err = parse_str("[decoder]\nchecksum = \"crc32\"\n").unwrap_err();
        assert!(matches!(err, GatewayError::ConfigParse { .. }));
    }

    #[test]
    fn test_validate_listen_address() {
        let mut config = Config::default();
        config.server.listen = "not-an-address".into();

        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            GatewayError::ConfigValidation {
                field: "server.listen",
                ..
            }
        ));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.server.idle_timeout_secs = 0;

        assert!(matches!(
            config.validate(),
            Err(GatewayError::ConfigValidation {
                field: "server.idle_timeout_secs",
                ..
            })
        ));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.server.listen = "127.0.0.1:6000".into();
        config.decoder.checksum = ChecksumMode::Xor;

        let text = toml::to_string_pretty(&config).unwrap();
        let restored = parse_str(&text).unwrap();

        assert_eq!(restored.server.listen, "127.0.0.1:6000");
        assert_eq!(restored.decoder.checksum, ChecksumMode::Xor);
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = load(Some(Path::new("/nonexistent/telegram-gateway.toml"))).unwrap_err();
        assert!(matches!(err, GatewayError::Io { .. }));
    }
}
