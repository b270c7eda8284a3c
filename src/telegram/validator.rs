//! Structural validation of candidate frames
//!
//! Checks run in order and stop at the first failure:
//! 1. length matches the sensor type's width
//! 2. start marker
//! 3. sensor type classified (unknown types pass through)
//! 4. tail marker
//! 5. checksum, when an algorithm is configured

use super::error::DecodeError;
use super::frame::{
    checksum_covered, resolve_width, Frame, FrameWidth, SensorType, START_MARKER, TAIL_MARKER,
};
use crate::codec::Checksum;
use bytes::Bytes;
use std::sync::Arc;
use tracing::warn;

/// Validates candidate frames produced by the assembler
#[derive(Clone)]
pub struct FrameValidator {
    checksum: Option<Arc<dyn Checksum>>,
}

impl Default for FrameValidator {
    fn default() -> Self {
        Self::new(Some(Arc::new(crate::codec::Sum8)))
    }
}

impl FrameValidator {
    /// Create a validator; `None` disables checksum verification
    pub fn new(checksum: Option<Arc<dyn Checksum>>) -> Self {
        Self { checksum }
    }

    /// Validator that never compares the checksum byte
    pub fn without_checksum() -> Self {
        Self::new(None)
    }

    /// Name of the checksum in use, `"off"` when disabled
    pub fn checksum_name(&self) -> &'static str {
        self.checksum.as_ref().map_or("off", |c| c.name())
    }

    /// Validate a candidate frame
    pub fn validate(&self, candidate: Bytes) -> Result<Frame, DecodeError> {
        let width = match resolve_width(&candidate) {
            FrameWidth::Width(width) => width,
            FrameWidth::NeedMore(needed) => {
                return Err(DecodeError::TruncatedFrame {
                    expected: needed,
                    actual: candidate.len(),
                })
            }
            FrameWidth::Impossible => {
                return Err(DecodeError::InvalidHeader {
                    found: candidate[0],
                })
            }
        };
        if candidate.len() < width {
            return Err(DecodeError::TruncatedFrame {
                expected: width,
                actual: candidate.len(),
            });
        }

        if candidate[0] != START_MARKER {
            return Err(DecodeError::InvalidHeader {
                found: candidate[0],
            });
        }

        let sensor_type = SensorType::from_code(candidate[1]);

        // Tail must sit exactly where the width puts it
        let last = candidate[candidate.len() - 1];
        if candidate.len() != width || last != TAIL_MARKER {
            return Err(DecodeError::InvalidFrameTail { found: last });
        }

        if let Some(ref checksum) = self.checksum {
            let expected = checksum.compute(checksum_covered(&candidate));
            let found = candidate[width - 2];
            if expected != found {
                return Err(DecodeError::ChecksumMismatch { expected, found });
            }
        }

        let frame = Frame::new(candidate, sensor_type);
        if let Some((declared, expected)) = frame.length_mismatch() {
            warn!(
                sensor_type = %sensor_type,
                declared,
                expected,
                "Declared length disagrees with frame width"
            );
        }
        Ok(frame)
    }
}
