//! In-memory sink collecting readings and diagnostics
//!
//! Useful for embedding the decoder and for tests.

use crate::dispatch::{Diagnostic, DiagnosticSink, ReadingSink};
use crate::telegram::StoredReading;
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct MemorySink {
    readings: Mutex<Vec<StoredReading>>,
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every reading received so far
    pub fn readings(&self) -> Vec<StoredReading> {
        self.readings.lock().clone()
    }

    /// Copy of every diagnostic received so far
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    /// Take and clear collected readings
    pub fn drain_readings(&self) -> Vec<StoredReading> {
        std::mem::take(&mut *self.readings.lock())
    }
}

impl ReadingSink for MemorySink {
    fn submit(&self, reading: StoredReading) {
        self.readings.lock().push(reading);
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().push(diagnostic);
    }
}
