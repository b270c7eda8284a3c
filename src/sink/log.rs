//! Sinks that only log
//!
//! `LogSink` is the default reading sink when no storage is configured.
//! `LogDiagnostics` is the default diagnostic sink in every setup.

use crate::dispatch::{Diagnostic, DiagnosticSink, ReadingSink};
use crate::telegram::frame::hex_dump;
use crate::telegram::{DecodeError, StoredReading};
use tracing::{info, warn};

/// Logs each reading at info level with its per-terminal table name
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ReadingSink for LogSink {
    fn submit(&self, reading: StoredReading) {
        let table = reading.table_name();
        match reading {
            StoredReading::Wind(w) => info!(
                table = %table,
                speed_3s = w.avg_speed_3s,
                dir_3s = w.wind_dir_3s,
                speed_2m = w.avg_speed_2m,
                dir_2m = w.wind_dir_2m,
                speed_10m = w.avg_speed_10m,
                dir_10m = w.wind_dir_10m,
                battery = w.battery,
                status = w.status,
                "Wind reading"
            ),
            StoredReading::Rain(r) => info!(
                table = %table,
                per_minute = r.avg_rain_per_minute,
                per_hour = r.avg_rain_per_hour,
                per_day = r.avg_rain_per_day,
                total = r.total_rainfall,
                battery = r.battery,
                status = r.status,
                "Rain reading"
            ),
        }
    }
}

/// Logs rejected frames with a hex dump of their bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl DiagnosticSink for LogDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        let Diagnostic {
            connection,
            reason,
            raw,
        } = diagnostic;
        match reason {
            // Expected as the protocol grows, not a fault
            DecodeError::UnknownSensorType { code } => info!(
                connection = %connection,
                sensor_type = code,
                "Unknown sensor type: {}",
                hex_dump(&raw)
            ),
            reason => warn!(
                connection = %connection,
                reason = reason.kind(),
                "{}: {}",
                reason,
                hex_dump(&raw)
            ),
        }
    }
}
