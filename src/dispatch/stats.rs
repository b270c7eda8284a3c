//! Decoding statistics for the gateway
//!
//! Thread-safe counters shared by every connection.
//! Uses lock-free atomics for all operations.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Gateway-wide counters (fully lock-free)
pub struct Stats {
    /// Total bytes read from terminals
    bytes_received: AtomicU64,
    /// Bytes dropped before a start marker
    garbage_bytes: AtomicU64,
    /// Frames that passed validation and decoding
    frames_accepted: AtomicU64,
    /// Frames rejected by the validator or decoder
    frames_rejected: AtomicU64,
    /// Readings handed to the reading sink
    readings_stored: AtomicU64,
    /// Frames with an unrecognized sensor type
    unknown_frames: AtomicU64,
    /// Soil frames recognized and ignored
    soil_ignored: AtomicU64,
    /// Terminal connections accepted
    connections: AtomicU64,
    /// Reference instant for uptime
    start_time: Instant,
}

/// Point-in-time copy of [`Stats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub bytes_received: u64,
    pub garbage_bytes: u64,
    pub frames_accepted: u64,
    pub frames_rejected: u64,
    pub readings_stored: u64,
    pub unknown_frames: u64,
    pub soil_ignored: u64,
    pub connections: u64,
    pub uptime_secs: u64,
}

impl Stats {
    pub fn new() -> Self {
        Self {
            bytes_received: AtomicU64::new(0),
            garbage_bytes: AtomicU64::new(0),
            frames_accepted: AtomicU64::new(0),
            frames_rejected: AtomicU64::new(0),
            readings_stored: AtomicU64::new(0),
            unknown_frames: AtomicU64::new(0),
            soil_ignored: AtomicU64::new(0),
            connections: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    #[inline]
    pub fn add_bytes(&self, bytes: usize) {
        self.bytes_received.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_garbage(&self, bytes: u64) {
        self.garbage_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn frame_accepted(&self) {
        self.frames_accepted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn frame_rejected(&self) {
        self.frames_rejected.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn reading_stored(&self) {
        self.readings_stored.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn unknown_frame(&self) {
        self.unknown_frames.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn soil_ignored(&self) {
        self.soil_ignored.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn connection_opened(&self) {
        self.connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            garbage_bytes: self.garbage_bytes.load(Ordering::Relaxed),
            frames_accepted: self.frames_accepted.load(Ordering::Relaxed),
            frames_rejected: self.frames_rejected.load(Ordering::Relaxed),
            readings_stored: self.readings_stored.load(Ordering::Relaxed),
            unknown_frames: self.unknown_frames.load(Ordering::Relaxed),
            soil_ignored: self.soil_ignored.load(Ordering::Relaxed),
            connections: self.connections.load(Ordering::Relaxed),
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}
