//! Numeric field encodings used inside telegram payloads
//!
//! Two encodings share the payload:
//! - **Scaled integer**: two bytes holding decimal digit pairs, `hi * 100 + lo`.
//!   Wind speeds divide the result by 100, directions use it as is.
//! - **binary32**: four bytes, most significant first, holding the bit
//!   pattern of an IEEE-754 single precision float.
//!
//! Everything is explicit big-endian; the host byte order never matters.

use crate::telegram::FormatError;
use serde::{Deserialize, Serialize};

/// Width of a binary32 field
pub const BINARY32_WIDTH: usize = 4;

/// How digit-pair bytes above 99 are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaledIntMode {
    /// Any byte value is accepted and combined as `hi * 100 + lo`
    #[default]
    Permissive,
    /// A byte above 99 is a `FormatError`
    Strict,
}

/// Decode a two-byte scaled integer into its raw count (`hi * 100 + lo`)
///
/// `(1, 50)` gives 150, which a speed field reads as 1.50.
pub fn decode_scaled_int(hi: u8, lo: u8, mode: ScaledIntMode) -> Result<u16, FormatError> {
    if mode == ScaledIntMode::Strict {
        for byte in [hi, lo] {
            if byte > 99 {
                return Err(FormatError::DigitOutOfRange { byte });
            }
        }
    }
    Ok(u16::from(hi) * 100 + u16::from(lo))
}

/// Decode a scaled integer carrying two implied decimals
#[inline]
pub fn decode_centi(hi: u8, lo: u8, mode: ScaledIntMode) -> Result<f64, FormatError> {
    decode_scaled_int(hi, lo, mode).map(|raw| f64::from(raw) / 100.0)
}

/// Encode a raw count as two digit-pair bytes
///
/// Values up to 9999 produce bytes in 0..=99. Larger values are still
/// representable while the high byte fits (permissive decoders read them
/// back), anything beyond is a `FormatError`.
pub fn encode_scaled_int(raw: u32) -> Result<[u8; 2], FormatError> {
    let hi = u8::try_from(raw / 100).map_err(|_| FormatError::ScaledOverflow { raw })?;
    Ok([hi, (raw % 100) as u8])
}

/// Encode a value with two implied decimals (`1.5` -> `[1, 50]`)
pub fn encode_centi(value: f64) -> Result<[u8; 2], FormatError> {
    let scaled = (value * 100.0).round();
    if !(0.0..=f64::from(u32::MAX)).contains(&scaled) {
        return Err(FormatError::ScaledOverflow { raw: u32::MAX });
    }
    encode_scaled_int(scaled as u32)
}

/// Reinterpret exactly four big-endian bytes as an IEEE-754 binary32
pub fn decode_binary32(bytes: &[u8]) -> Result<f32, FormatError> {
    let group: [u8; BINARY32_WIDTH] =
        bytes.try_into().map_err(|_| FormatError::WrongLength {
            expected: BINARY32_WIDTH,
            actual: bytes.len(),
        })?;
    Ok(f32::from_bits(u32::from_be_bytes(group)))
}

/// Bit pattern of `value`, most significant byte first
#[inline]
pub fn encode_binary32(value: f32) -> [u8; BINARY32_WIDTH] {
    value.to_bits().to_be_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scaled_int_digit_pairs() {
        assert_eq!(decode_scaled_int(1, 50, ScaledIntMode::Strict), Ok(150));
        assert_eq!(decode_scaled_int(3, 60, ScaledIntMode::Strict), Ok(360));
        assert_eq!(decode_centi(1, 50, ScaledIntMode::Strict), Ok(1.5));
    }

    #[test]
    fn test_scaled_int_permissive_accepts_large_low_byte() {
        // 0x96 = 150 lands in the low byte when a producer skips the split
        assert_eq!(decode_scaled_int(0x00, 0x96, ScaledIntMode::Permissive), Ok(150));
        assert_eq!(decode_centi(0x00, 0x96, ScaledIntMode::Permissive), Ok(1.5));
    }

    #[test]
    fn test_scaled_int_strict_rejects_large_digit() {
        assert_eq!(
            decode_scaled_int(0x00, 0x96, ScaledIntMode::Strict),
            Err(FormatError::DigitOutOfRange { byte: 0x96 })
        );
        assert_eq!(
            decode_scaled_int(100, 0, ScaledIntMode::Strict),
            Err(FormatError::DigitOutOfRange { byte: 100 })
        );
    }

    #[test]
    fn test_scaled_int_max_permissive() {
        assert_eq!(
            decode_scaled_int(0xFF, 0xFF, ScaledIntMode::Permissive),
            Ok(255 * 100 + 255)
        );
    }

    #[test]
    fn test_encode_scaled_int_overflow() {
        assert_eq!(encode_scaled_int(25_599), Ok([255, 99]));
        assert_eq!(
            encode_scaled_int(25_600),
            Err(FormatError::ScaledOverflow { raw: 25_600 })
        );
    }

    #[test]
    fn test_binary32_known_values() {
        assert_eq!(decode_binary32(&[0x00, 0x00, 0x00, 0x00]), Ok(0.0));
        assert_eq!(decode_binary32(&[0x3F, 0x80, 0x00, 0x00]), Ok(1.0));
        assert_eq!(decode_binary32(&[0x40, 0x20, 0x00, 0x00]), Ok(2.5));
        assert_eq!(decode_binary32(&[0x42, 0xC8, 0x00, 0x00]), Ok(100.0));
        assert_eq!(decode_binary32(&[0xC0, 0x00, 0x00, 0x00]), Ok(-2.0));
    }

    #[test]
    fn test_binary32_wrong_length() {
        assert_eq!(
            decode_binary32(&[0x3F, 0x80, 0x00]),
            Err(FormatError::WrongLength {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(
            decode_binary32(&[0; 5]),
            Err(FormatError::WrongLength {
                expected: 4,
                actual: 5
            })
        );
    }

    proptest! {
        #[test]
        fn prop_binary32_matches_ieee_bits(bytes in any::<[u8; 4]>()) {
            let decoded = decode_binary32(&bytes).unwrap();
            let reference = f32::from_bits(
                (u32::from(bytes[0]) << 24)
                    | (u32::from(bytes[1]) << 16)
                    | (u32::from(bytes[2]) << 8)
                    | u32::from(bytes[3]),
            );
            // Compare bits so NaN payloads count as equal
            prop_assert_eq!(decoded.to_bits(), reference.to_bits());
            prop_assert_eq!(encode_binary32(decoded), bytes);
        }

        #[test]
        fn prop_scaled_int_two_decimals(cents in 0u32..=9999) {
            let value = f64::from(cents) / 100.0;
            let [hi, lo] = encode_centi(value).unwrap();
            let decoded = decode_centi(hi, lo, ScaledIntMode::Strict).unwrap();
            prop_assert!((decoded - value).abs() < 0.005);
        }
    }
}
