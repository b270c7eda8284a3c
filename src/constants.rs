//! Application-wide constants
//!
//! Centralized constants to avoid duplication and ensure consistency.

// =============================================================================
// Network
// =============================================================================

/// Default listen address for sensor terminals
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:59666";

/// Seconds without data before a terminal connection is closed
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 10;

/// Size of a single socket read
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// Interval at which the accept loop checks the shutdown flag (milliseconds)
pub const SHUTDOWN_POLL_INTERVAL_MS: u64 = 100;

/// Maximum socket bind retry attempts
pub const MAX_SOCKET_RETRY_ATTEMPTS: u32 = 5;

/// Base delay between retry attempts (milliseconds)
pub const RETRY_BASE_DELAY_MS: u64 = 200;

/// Pending connection backlog for the listener
pub const LISTEN_BACKLOG: i32 = 128;

// =============================================================================
// Files
// =============================================================================

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "telegram-gateway.toml";

/// Default output path for the JSON-lines sink
pub const DEFAULT_JSONL_PATH: &str = "readings.jsonl";

/// Lines queued for the JSON-lines writer thread before readings are dropped
pub const JSONL_QUEUE_CAPACITY: usize = 4096;

// =============================================================================
// Synthetic client
// =============================================================================

/// Default delay between synthetic telegrams (milliseconds)
pub const DEFAULT_SEND_INTERVAL_MS: u64 = 5000;

/// Gateway address stamped on synthetic telegrams
pub const SYNTHETIC_GATEWAY_ADDR: u8 = 0x01;
