//! Command-line interface definition using clap
//!
//! Provides structured argument parsing with automatic help generation.

use crate::client::SendKind;
use crate::codec::ChecksumMode;
use crate::constants::DEFAULT_SEND_INTERVAL_MS;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

// =============================================================================
// CLI Definition
// =============================================================================

/// TCP gateway for field sensor telegrams
#[derive(Parser, Debug, Default)]
#[command(name = "telegram-gateway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: ./telegram-gateway.toml if present)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Listen address (overrides config)
    #[arg(long, value_name = "ADDR", global = true)]
    pub listen: Option<String>,

    /// Checksum algorithm: sum, xor or off (overrides config)
    #[arg(long, value_name = "MODE", global = true)]
    pub checksum: Option<ChecksumMode>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Accept terminal connections and decode telegrams (default)
    Serve,

    /// Act as a terminal: send synthetic telegrams to a gateway
    Send {
        /// Gateway address
        #[arg(value_name = "ADDR", default_value = "127.0.0.1:59666")]
        addr: String,

        /// Telegram type
        #[arg(long, value_enum, default_value_t = SendKind::Wind)]
        kind: SendKind,

        /// Number of telegrams
        #[arg(long, default_value_t = 1)]
        count: u32,

        /// Delay between telegrams
        #[arg(long, value_name = "MS", default_value_t = DEFAULT_SEND_INTERVAL_MS)]
        interval_ms: u64,

        /// Write each telegram in two halves
        #[arg(long)]
        split: bool,

        /// Terminal address stamped on each telegram
        #[arg(long, default_value_t = 1)]
        terminal: u8,

        /// Sensor address stamped on each telegram
        #[arg(long, default_value_t = 1)]
        sensor: u8,
    },
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_defaults() {
        let cli = Cli::parse_from(["telegram-gateway"]);
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
        assert!(cli.checksum.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_verbose() {
        let cli = Cli::parse_from(["telegram-gateway", "-v"]);
        assert!(cli.verbose);

        let cli = Cli::parse_from(["telegram-gateway", "--verbose"]);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_parse_overrides() {
        let cli = Cli::parse_from([
            "telegram-gateway",
            "--listen",
            "127.0.0.1:7000",
            "--checksum",
            "off",
            "--config",
            "gw.toml",
        ]);
        assert_eq!(cli.listen.as_deref(), Some("127.0.0.1:7000"));
        assert_eq!(cli.checksum, Some(ChecksumMode::Off));
        assert_eq!(cli.config, Some(PathBuf::from("gw.toml")));
    }

    #[test]
    fn test_cli_rejects_unknown_checksum() {
        assert!(Cli::try_parse_from(["telegram-gateway", "--checksum", "crc"]).is_err());
    }

    #[test]
    fn test_cli_parse_serve() {
        let cli = Cli::parse_from(["telegram-gateway", "serve"]);
        assert!(matches!(cli.command, Some(Command::Serve)));
    }

    #[test]
    fn test_cli_parse_send() {
        let cli = Cli::parse_from([
            "telegram-gateway",
            "send",
            "10.0.0.5:59666",
            "--kind",
            "rain",
            "--count",
            "3",
            "--interval-ms",
            "250",
            "--split",
        ]);
        match cli.command {
            Some(Command::Send {
                addr,
                kind,
                count,
                interval_ms,
                split,
                terminal,
                sensor,
            }) => {
                assert_eq!(addr, "10.0.0.5:59666");
                assert_eq!(kind, SendKind::Rain);
                assert_eq!(count, 3);
                assert_eq!(interval_ms, 250);
                assert!(split);
                assert_eq!((terminal, sensor), (1, 1));
            }
            _ => panic!("Expected Send command"),
        }
    }

    #[test]
    fn test_cli_parse_send_defaults() {
        let cli = Cli::parse_from(["telegram-gateway", "send"]);
        match cli.command {
            Some(Command::Send {
                addr,
                kind,
                interval_ms,
                ..
            }) => {
                assert_eq!(addr, "127.0.0.1:59666");
                assert_eq!(kind, SendKind::Wind);
                assert_eq!(interval_ms, DEFAULT_SEND_INTERVAL_MS);
            }
            _ => panic!("Expected Send command"),
        }
    }
}
