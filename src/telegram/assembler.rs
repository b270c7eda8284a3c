//! Stream reassembly for telegram frames
//!
//! TCP gives no guarantee that one read carries one telegram. The assembler
//! buffers bytes per connection and emits candidate frames once a start
//! marker and the full width for its sensor type are buffered:
//! - a frame split across reads waits for the rest
//! - several frames in one read are emitted in order
//! - bytes before a start marker are garbage and dropped
//!
//! A `0x23` inside garbage looks like any other start marker. The consumer
//! answers each candidate with a [`Verdict`]; only a candidate that ends in
//! the tail marker and is accepted consumes its full width. Anything else
//! drops the marker byte alone and scanning resumes right after it, so a
//! real frame hidden inside a false candidate is still found.

use super::frame::{resolve_width, FrameWidth, SensorType, START_MARKER, TAIL_MARKER};
use bytes::{Buf, Bytes, BytesMut};
use tracing::debug;

/// Bytes extracted from the stream, starting at a start marker and as wide
/// as its sensor type requires. Not validated yet.
pub type CandidateFrame = Bytes;

/// What the consumer made of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Structurally sound frame; its bytes are consumed
    Consume,
    /// False start; only the marker byte is dropped
    Resync,
}

/// Per-connection frame assembler
pub struct FrameAssembler {
    buffer: BytesMut,
    /// Garbage bytes dropped since creation
    discarded: u64,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    /// Create a new assembler with an empty buffer
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(256),
            discarded: 0,
        }
    }

    /// Feed a chunk from the transport
    ///
    /// Calls `on_frame` for each complete candidate frame, in stream order.
    /// Incomplete trailing data stays buffered for the next call.
    pub fn feed(&mut self, data: &[u8], mut on_frame: impl FnMut(CandidateFrame) -> Verdict) {
        self.buffer.extend_from_slice(data);

        loop {
            let Some(start) = self.buffer.iter().position(|&b| b == START_MARKER) else {
                self.drop_garbage(self.buffer.len());
                return;
            };
            self.drop_garbage(start);

            match resolve_width(&self.buffer) {
                FrameWidth::NeedMore(_) => return,
                FrameWidth::Impossible => {
                    // False start: resume scanning after this marker
                    self.drop_garbage(1);
                }
                FrameWidth::Width(width) if self.buffer.len() < width => {
                    // A declared length is only a hint; give up on it once a
                    // complete known frame is already waiting behind it
                    if self.declares_width() && self.known_frame_buffered() {
                        self.drop_garbage(1);
                        continue;
                    }
                    return;
                }
                FrameWidth::Width(width) => {
                    let framed = self.buffer[width - 1] == TAIL_MARKER;
                    let candidate = Bytes::copy_from_slice(&self.buffer[..width]);
                    match on_frame(candidate) {
                        Verdict::Consume if framed => self.buffer.advance(width),
                        _ => self.drop_garbage(1),
                    }
                }
            }
        }
    }

    /// Collect all candidates from one chunk, accepting each of them
    pub fn feed_collect(&mut self, data: &[u8]) -> Vec<CandidateFrame> {
        let mut frames = Vec::new();
        self.feed(data, |f| {
            frames.push(f);
            Verdict::Consume
        });
        frames
    }

    /// Bytes of an incomplete frame currently buffered
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Total garbage bytes dropped
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Drop any partial frame, returning how many bytes were discarded
    pub fn reset(&mut self) -> usize {
        let pending = self.buffer.len();
        self.buffer.clear();
        pending
    }

    /// Whether the buffered frame takes its width from the length byte
    fn declares_width(&self) -> bool {
        SensorType::from_code(self.buffer[1]).frame_width().is_none()
    }

    /// A later marker starts a known-type frame that is fully buffered and
    /// ends in the tail marker
    fn known_frame_buffered(&self) -> bool {
        (1..self.buffer.len())
            .filter(|&at| self.buffer[at] == START_MARKER)
            .any(|at| {
                let rest = &self.buffer[at..];
                rest.get(1)
                    .and_then(|&code| SensorType::from_code(code).frame_width())
                    .is_some_and(|width| rest.len() >= width && rest[width - 1] == TAIL_MARKER)
            })
    }

    fn drop_garbage(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        debug!(
            bytes = count,
            "Discarding garbage before start marker: {}",
            super::frame::hex_dump(&self.buffer[..count])
        );
        self.buffer.advance(count);
        self.discarded += count as u64;
    }
}
