//! Telegram wire format
//!
//! ```text
//! ┌──────┬──────┬─────┬──────┬────────┬─────┬───────────┬─────┬──────┐
//! │ 0x23 │ type │ gw  │ term │ sensor │ len │ payload…  │ sum │ 0x21 │
//! └──────┴──────┴─────┴──────┴────────┴─────┴───────────┴─────┴──────┘
//!   0      1      2     3      4        5     6..N-2      N-2   N-1
//! ```
//!
//! Frame width is fixed per sensor type. Soil probes carry no length byte:
//! their first probe address sits at offset 4 and its data starts at 5.

use bytes::Bytes;
use serde::Serialize;
use std::fmt;

/// First byte of every frame
pub const START_MARKER: u8 = 0x23;

/// Last byte of every frame
pub const TAIL_MARKER: u8 = 0x21;

/// Smallest frame: 6 header bytes, checksum and tail
pub const MIN_FRAME_WIDTH: usize = 8;

/// Bytes needed before a known sensor type's width can be resolved
pub const TYPE_HEADER_LEN: usize = 2;

/// Bytes needed before an unknown sensor type's width can be resolved
pub const HEADER_LEN: usize = 6;

pub const WIND_FRAME_WIDTH: usize = 22;
pub const SOIL_FRAME_WIDTH: usize = 23;
pub const RAIN_FRAME_WIDTH: usize = 26;

const OFFSET_TYPE: usize = 1;
const OFFSET_GATEWAY: usize = 2;
const OFFSET_TERMINAL: usize = 3;
const OFFSET_SENSOR: usize = 4;
const OFFSET_LENGTH: usize = 5;

/// Sensor type discriminant (byte 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorType {
    Wind,
    Soil,
    Rain,
    Unknown(u8),
}

impl SensorType {
    pub fn from_code(code: u8) -> Self {
        match code {
            0x01 => Self::Wind,
            0x02 => Self::Soil,
            0x03 => Self::Rain,
            other => Self::Unknown(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Wind => 0x01,
            Self::Soil => 0x02,
            Self::Rain => 0x03,
            Self::Unknown(code) => code,
        }
    }

    /// Fixed frame width, `None` for unknown types
    pub fn frame_width(self) -> Option<usize> {
        match self {
            Self::Wind => Some(WIND_FRAME_WIDTH),
            Self::Soil => Some(SOIL_FRAME_WIDTH),
            Self::Rain => Some(RAIN_FRAME_WIDTH),
            Self::Unknown(_) => None,
        }
    }

    /// Whether byte 5 is a declared-length field for this type
    pub fn has_length_field(self) -> bool {
        !matches!(self, Self::Soil)
    }

    /// Table/series prefix used by sinks
    pub fn label(self) -> &'static str {
        match self {
            Self::Wind => "wind",
            Self::Soil => "soil",
            Self::Rain => "rain",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "unknown(0x{:02X})", code),
            known => f.write_str(known.label()),
        }
    }
}

/// Outcome of looking at the first bytes after a start marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameWidth {
    /// Not enough bytes buffered to decide
    NeedMore(usize),
    /// Frame is this many bytes long, marker included
    Width(usize),
    /// Header declares a width no frame can have
    Impossible,
}

/// Resolve the frame width from the bytes starting at a start marker
///
/// Known types use their fixed width. Unknown types trust the declared
/// length, which counts every byte after the start marker.
pub fn resolve_width(header: &[u8]) -> FrameWidth {
    if header.len() < TYPE_HEADER_LEN {
        return FrameWidth::NeedMore(TYPE_HEADER_LEN);
    }
    if let Some(width) = SensorType::from_code(header[OFFSET_TYPE]).frame_width() {
        return FrameWidth::Width(width);
    }
    if header.len() < HEADER_LEN {
        return FrameWidth::NeedMore(HEADER_LEN);
    }
    let width = usize::from(header[OFFSET_LENGTH]) + 1;
    if width < MIN_FRAME_WIDTH {
        FrameWidth::Impossible
    } else {
        FrameWidth::Width(width)
    }
}

/// A structurally validated telegram
///
/// Only [`FrameValidator`](super::FrameValidator) builds frames, so every
/// accessor can index without bounds checks failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Bytes,
    sensor_type: SensorType,
}

impl Frame {
    pub(crate) fn new(bytes: Bytes, sensor_type: SensorType) -> Self {
        Self { bytes, sensor_type }
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    pub fn gateway_address(&self) -> u8 {
        self.bytes[OFFSET_GATEWAY]
    }

    pub fn terminal_address(&self) -> u8 {
        self.bytes[OFFSET_TERMINAL]
    }

    /// Sensor address (for soil frames: the first probe's address)
    pub fn sensor_address(&self) -> u8 {
        self.bytes[OFFSET_SENSOR]
    }

    /// Declared length byte, `None` for layouts without one
    pub fn declared_length(&self) -> Option<u8> {
        self.sensor_type
            .has_length_field()
            .then(|| self.bytes[OFFSET_LENGTH])
    }

    /// Declared length this frame's width implies
    pub fn expected_declared_length(&self) -> Option<u8> {
        self.sensor_type
            .has_length_field()
            .then(|| u8::try_from(self.bytes.len() - 1).unwrap_or(u8::MAX))
    }

    /// `(declared, expected)` when the length byte disagrees with the width
    pub fn length_mismatch(&self) -> Option<(u8, u8)> {
        match (self.declared_length(), self.expected_declared_length()) {
            (Some(declared), Some(expected)) if declared != expected => Some((declared, expected)),
            _ => None,
        }
    }

    pub fn checksum(&self) -> u8 {
        self.bytes[self.bytes.len() - 2]
    }

    /// Bytes strictly between the sensor type and the checksum
    pub fn checksum_covered(&self) -> &[u8] {
        checksum_covered(&self.bytes)
    }

    /// Whole frame, markers included
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Cheap clone of the underlying bytes
    pub fn raw(&self) -> Bytes {
        self.bytes.clone()
    }
}

/// Checksum coverage of a full-width frame (`2..N-2`)
pub(crate) fn checksum_covered(frame: &[u8]) -> &[u8] {
    &frame[OFFSET_GATEWAY..frame.len() - 2]
}

/// Format bytes as spaced uppercase hex (`23 01 0A`)
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{:02X}", b));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_type_codes() {
        for code in 0u8..=255 {
            assert_eq!(SensorType::from_code(code).code(), code);
        }
        assert_eq!(SensorType::from_code(0x01), SensorType::Wind);
        assert_eq!(SensorType::from_code(0x02), SensorType::Soil);
        assert_eq!(SensorType::from_code(0x03), SensorType::Rain);
        assert_eq!(SensorType::from_code(0x07), SensorType::Unknown(0x07));
    }

    #[test]
    fn test_resolve_width_known_types() {
        assert_eq!(resolve_width(&[0x23]), FrameWidth::NeedMore(2));
        assert_eq!(resolve_width(&[0x23, 0x01]), FrameWidth::Width(22));
        assert_eq!(resolve_width(&[0x23, 0x02]), FrameWidth::Width(23));
        assert_eq!(resolve_width(&[0x23, 0x03]), FrameWidth::Width(26));
    }

    #[test]
    fn test_resolve_width_unknown_uses_declared_length() {
        assert_eq!(resolve_width(&[0x23, 0x09, 1, 1]), FrameWidth::NeedMore(6));
        assert_eq!(
            resolve_width(&[0x23, 0x09, 1, 1, 1, 0x0B]),
            FrameWidth::Width(12)
        );
        assert_eq!(
            resolve_width(&[0x23, 0x09, 1, 1, 1, 0x03]),
            FrameWidth::Impossible
        );
    }

    #[test]
    fn test_frame_accessors() {
        let mut raw = vec![0x23, 0x01, 0x0A, 0x0B, 0x0C, 0x15];
        raw.extend_from_slice(&[0u8; 14]);
        raw.extend_from_slice(&[0x00, 0x21]);
        let frame = Frame::new(Bytes::from(raw), SensorType::Wind);

        assert_eq!(frame.gateway_address(), 0x0A);
        assert_eq!(frame.terminal_address(), 0x0B);
        assert_eq!(frame.sensor_address(), 0x0C);
        assert_eq!(frame.declared_length(), Some(21));
        assert_eq!(frame.length_mismatch(), None);
        assert_eq!(frame.checksum_covered().len(), 18);
    }

    #[test]
    fn test_length_mismatch_reported() {
        let mut raw = vec![0x23, 0x01, 0x01, 0x01, 0x01, 0x17];
        raw.extend_from_slice(&[0u8; 14]);
        raw.extend_from_slice(&[0x00, 0x21]);
        let frame = Frame::new(Bytes::from(raw), SensorType::Wind);

        assert_eq!(frame.length_mismatch(), Some((0x17, 21)));
    }

    #[test]
    fn test_soil_has_no_declared_length() {
        let mut raw = vec![0x23, 0x02, 0x01, 0x01, 0x01];
        raw.extend_from_slice(&[0u8; 16]);
        raw.extend_from_slice(&[0x00, 0x21]);
        let frame = Frame::new(Bytes::from(raw), SensorType::Soil);

        assert_eq!(frame.declared_length(), None);
        assert_eq!(frame.length_mismatch(), None);
    }

    #[test]
    fn test_hex_dump() {
        assert_eq!(hex_dump(&[0x23, 0x01, 0xAB]), "23 01 AB");
        assert_eq!(hex_dump(&[]), "");
    }
}
