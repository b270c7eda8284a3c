//! Frame-level error taxonomy
//!
//! Every variant is local to one frame: the assembler discards the frame's
//! bytes and carries on with the rest of the stream.

use std::fmt;

/// Numeric field could not be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// A decimal digit-pair byte exceeded 99 in strict mode
    DigitOutOfRange { byte: u8 },
    /// A fixed-width field was handed the wrong number of bytes
    WrongLength { expected: usize, actual: usize },
    /// A value does not fit the two-byte scaled encoding
    ScaledOverflow { raw: u32 },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DigitOutOfRange { byte } => {
                write!(f, "Digit pair out of range: 0x{:02X} ({} > 99)", byte, byte)
            }
            Self::WrongLength { expected, actual } => {
                write!(f, "Wrong field length: {} bytes (expected {})", actual, expected)
            }
            Self::ScaledOverflow { raw } => {
                write!(f, "Value {} does not fit a scaled integer field", raw)
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// Why a frame was not turned into a stored reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer bytes than the sensor type's frame width
    TruncatedFrame { expected: usize, actual: usize },
    /// Start marker missing, or the header declares an impossible width
    InvalidHeader { found: u8 },
    /// Sensor type outside the known set (diagnostic only, never a rejection)
    UnknownSensorType { code: u8 },
    /// Last byte is not the tail marker
    InvalidFrameTail { found: u8 },
    /// Checksum byte disagrees with the computed value
    ChecksumMismatch { expected: u8, found: u8 },
    /// A numeric field could not be decoded
    Format(FormatError),
}

impl DecodeError {
    /// Short stable label, used for log fields and counters
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TruncatedFrame { .. } => "truncated_frame",
            Self::InvalidHeader { .. } => "invalid_header",
            Self::UnknownSensorType { .. } => "unknown_sensor_type",
            Self::InvalidFrameTail { .. } => "invalid_frame_tail",
            Self::ChecksumMismatch { .. } => "checksum_mismatch",
            Self::Format(_) => "format_error",
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TruncatedFrame { expected, actual } => {
                write!(f, "Truncated frame: {} bytes (expected {})", actual, expected)
            }
            Self::InvalidHeader { found } => write!(f, "Invalid frame header: 0x{:02X}", found),
            Self::UnknownSensorType { code } => write!(f, "Unknown sensor type: 0x{:02X}", code),
            Self::InvalidFrameTail { found } => write!(f, "Invalid frame tail: 0x{:02X}", found),
            Self::ChecksumMismatch { expected, found } => write!(
                f,
                "Checksum mismatch: computed 0x{:02X}, frame carries 0x{:02X}",
                expected, found
            ),
            Self::Format(e) => write!(f, "Data format error: {}", e),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Format(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FormatError> for DecodeError {
    fn from(e: FormatError) -> Self {
        Self::Format(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_checksum_mismatch() {
        let err = DecodeError::ChecksumMismatch {
            expected: 0x3C,
            found: 0x00,
        };
        assert_eq!(
            err.to_string(),
            "Checksum mismatch: computed 0x3C, frame carries 0x00"
        );
    }

    #[test]
    fn test_format_error_converts() {
        let err: DecodeError = FormatError::DigitOutOfRange { byte: 0x96 }.into();
        assert_eq!(err.kind(), "format_error");
        assert!(err.to_string().contains("0x96"));
    }
}
