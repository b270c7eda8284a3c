//! Routing of decode outcomes
//!
//! Every frame outcome goes to exactly one place:
//! - wind and rain readings to the [`ReadingSink`]
//! - rejections, format errors and unknown sensor types to the [`DiagnosticSink`]
//! - soil readings nowhere (recognized, not persisted)
//!
//! The dispatcher performs no I/O itself; that is the sinks' business.

pub mod stats;

use self::stats::Stats;
use crate::telegram::{DecodeError, Reading, StoredReading};
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Identifies one terminal connection for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A frame that did not become a stored reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub connection: ConnectionId,
    pub reason: DecodeError,
    /// Offending frame bytes, for forensic logging
    pub raw: Bytes,
}

/// Destination for decoded wind and rain readings
pub trait ReadingSink: Send + Sync {
    fn submit(&self, reading: StoredReading);
}

/// Destination for rejected or unhandled frames
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

impl<F> ReadingSink for F
where
    F: Fn(StoredReading) + Send + Sync,
{
    fn submit(&self, reading: StoredReading) {
        self(reading)
    }
}

impl<F> DiagnosticSink for F
where
    F: Fn(Diagnostic) + Send + Sync,
{
    fn report(&self, diagnostic: Diagnostic) {
        self(diagnostic)
    }
}

/// Where a single outcome ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Stored,
    Diagnosed,
    Ignored,
}

/// Routes outcomes for one connection
#[derive(Clone)]
pub struct Dispatcher {
    connection: ConnectionId,
    readings: Arc<dyn ReadingSink>,
    diagnostics: Arc<dyn DiagnosticSink>,
    stats: Arc<Stats>,
}

impl Dispatcher {
    pub fn new(
        connection: ConnectionId,
        readings: Arc<dyn ReadingSink>,
        diagnostics: Arc<dyn DiagnosticSink>,
        stats: Arc<Stats>,
    ) -> Self {
        Self {
            connection,
            readings,
            diagnostics,
            stats,
        }
    }

    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    pub fn stats(&self) -> &Arc<Stats> {
        &self.stats
    }

    /// Route one outcome; `raw` is the frame it came from
    pub fn dispatch(&self, outcome: Result<Reading, DecodeError>, raw: &Bytes) -> Disposition {
        let reading = match outcome {
            Ok(reading) => reading,
            Err(reason) => {
                self.stats.frame_rejected();
                self.diagnose(reason, raw);
                return Disposition::Diagnosed;
            }
        };

        self.stats.frame_accepted();
        match reading.into_stored() {
            Ok(stored) => {
                trace!(
                    connection = %self.connection,
                    table = %stored.table_name(),
                    "Reading decoded"
                );
                self.stats.reading_stored();
                self.readings.submit(stored);
                Disposition::Stored
            }
            Err(Reading::Unknown { sensor_type }) => {
                self.stats.unknown_frame();
                self.diagnose(DecodeError::UnknownSensorType { code: sensor_type }, raw);
                Disposition::Diagnosed
            }
            Err(_) => {
                trace!(connection = %self.connection, "Soil reading ignored");
                self.stats.soil_ignored();
                Disposition::Ignored
            }
        }
    }

    fn diagnose(&self, reason: DecodeError, raw: &Bytes) {
        self.diagnostics.report(Diagnostic {
            connection: self.connection,
            reason,
            raw: raw.clone(),
        });
    }
}
