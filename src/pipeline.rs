//! Per-connection decoding pipeline
//!
//! The pipeline handles:
//! - Stream reassembly (assembler)
//! - Validation and payload decoding
//! - Routing of every outcome (dispatcher)
//!
//! The pipeline does NOT handle:
//! - Socket reads or idle timeouts (that's the server's job)
//! - Persistence (that's the sink's job)
//!
//! One pipeline is owned by exactly one connection task; nothing in it is
//! shared except the sinks and counters behind the dispatcher.

use crate::codec::{ChecksumMode, ScaledIntMode};
use crate::dispatch::{Dispatcher, Disposition};
use crate::telegram::{FrameAssembler, FrameValidator, PayloadDecoder, Verdict};
use tracing::debug;

/// Decoder settings shared by every connection
#[derive(Clone, Default)]
pub struct DecoderSettings {
    pub validator: FrameValidator,
    pub decoder: PayloadDecoder,
}

impl DecoderSettings {
    pub fn new(checksum: ChecksumMode, scaled_int: ScaledIntMode) -> Self {
        Self {
            validator: FrameValidator::new(checksum.algorithm()),
            decoder: PayloadDecoder::new(scaled_int),
        }
    }
}

/// Counts of what one `push` produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushSummary {
    pub stored: usize,
    pub diagnosed: usize,
    pub ignored: usize,
}

impl PushSummary {
    pub fn frames(&self) -> usize {
        self.stored + self.diagnosed + self.ignored
    }
}

/// Bytes in, dispatched readings out
pub struct Pipeline {
    assembler: FrameAssembler,
    settings: DecoderSettings,
    dispatcher: Dispatcher,
}

impl Pipeline {
    pub fn new(settings: DecoderSettings, dispatcher: Dispatcher) -> Self {
        Self {
            assembler: FrameAssembler::new(),
            settings,
            dispatcher,
        }
    }

    /// Process one chunk from the transport
    pub fn push(&mut self, chunk: &[u8]) -> PushSummary {
        let stats = self.dispatcher.stats().clone();
        stats.add_bytes(chunk.len());
        let garbage_before = self.assembler.discarded();

        let mut summary = PushSummary::default();
        let settings = &self.settings;
        let dispatcher = &self.dispatcher;
        self.assembler.feed(chunk, |candidate| {
            let validated = settings.validator.validate(candidate.clone());
            // A frame that fails structurally may hide a real one behind its marker
            let verdict = if validated.is_ok() {
                Verdict::Consume
            } else {
                Verdict::Resync
            };
            let outcome = validated.and_then(|frame| settings.decoder.decode(&frame));
            match dispatcher.dispatch(outcome, &candidate) {
                Disposition::Stored => summary.stored += 1,
                Disposition::Diagnosed => summary.diagnosed += 1,
                Disposition::Ignored => summary.ignored += 1,
            }
            verdict
        });

        stats.add_garbage(self.assembler.discarded() - garbage_before);
        summary
    }

    /// Bytes of an incomplete frame still buffered
    pub fn pending(&self) -> usize {
        self.assembler.pending()
    }

    /// Discard any partial frame (idle timeout, teardown)
    pub fn reset(&mut self) {
        let dropped = self.assembler.reset();
        if dropped > 0 {
            debug!(
                connection = %self.dispatcher.connection(),
                bytes = dropped,
                "Discarding partial frame"
            );
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.reset();
    }
}
