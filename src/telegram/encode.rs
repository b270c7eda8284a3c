//! Frame encoding for wind and rain telegrams
//!
//! Used by the synthetic client and by tests to produce well-formed
//! telegrams with a correct checksum.

use super::error::FormatError;
use super::frame::{SensorType, RAIN_FRAME_WIDTH, START_MARKER, TAIL_MARKER, WIND_FRAME_WIDTH};
use super::payload::{RainReading, WindReading};
use crate::codec::numeric::{encode_binary32, encode_centi, encode_scaled_int};
use crate::codec::Checksum;

/// Encode a wind reading as a 22-byte telegram
///
/// Speeds and directions are split into digit pairs (`1.50` -> `01 32`).
/// With `checksum = None` the checksum slot is `0x00`, as field terminals send it.
pub fn encode_wind(
    reading: &WindReading,
    checksum: Option<&dyn Checksum>,
) -> Result<Vec<u8>, FormatError> {
    let mut out = header(
        SensorType::Wind,
        reading.gateway_address,
        reading.terminal_address,
        reading.sensor_address,
        WIND_FRAME_WIDTH,
    );
    for (speed, dir) in [
        (reading.avg_speed_3s, reading.wind_dir_3s),
        (reading.avg_speed_2m, reading.wind_dir_2m),
        (reading.avg_speed_10m, reading.wind_dir_10m),
    ] {
        out.extend_from_slice(&encode_centi(speed)?);
        out.extend_from_slice(&encode_scaled_int(u32::from(dir))?);
    }
    out.push(reading.battery);
    out.push(reading.status);
    Ok(finish(out, checksum))
}

/// Encode a rain reading as a 26-byte telegram
pub fn encode_rain(reading: &RainReading, checksum: Option<&dyn Checksum>) -> Vec<u8> {
    let mut out = header(
        SensorType::Rain,
        reading.gateway_address,
        reading.terminal_address,
        reading.sensor_address,
        RAIN_FRAME_WIDTH,
    );
    for value in [
        reading.avg_rain_per_minute,
        reading.avg_rain_per_hour,
        reading.avg_rain_per_day,
        reading.total_rainfall,
    ] {
        out.extend_from_slice(&encode_binary32(value));
    }
    out.push(reading.battery);
    out.push(reading.status);
    finish(out, checksum)
}

fn header(sensor_type: SensorType, gateway: u8, terminal: u8, sensor: u8, width: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(width);
    out.push(START_MARKER);
    out.push(sensor_type.code());
    out.push(gateway);
    out.push(terminal);
    out.push(sensor);
    // Declared length counts every byte after the start marker
    out.push((width - 1) as u8);
    out
}

fn finish(mut out: Vec<u8>, checksum: Option<&dyn Checksum>) -> Vec<u8> {
    let sum = checksum.map_or(0, |c| c.compute(&out[2..]));
    out.push(sum);
    out.push(TAIL_MARKER);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Sum8;
    use crate::telegram::{FrameValidator, PayloadDecoder, Reading};
    use bytes::Bytes;

    fn wind() -> WindReading {
        WindReading {
            gateway_address: 1,
            terminal_address: 2,
            sensor_address: 1,
            avg_speed_3s: 1.5,
            wind_dir_3s: 360,
            avg_speed_2m: 2.75,
            wind_dir_2m: 0,
            avg_speed_10m: 0.0,
            wind_dir_10m: 181,
            battery: 77,
            status: 1,
        }
    }

    #[test]
    fn test_encode_wind_layout() {
        let raw = encode_wind(&wind(), None).unwrap();

        assert_eq!(raw.len(), WIND_FRAME_WIDTH);
        assert_eq!(&raw[..6], &[0x23, 0x01, 0x01, 0x02, 0x01, 0x15]);
        assert_eq!(&raw[6..10], &[1, 50, 3, 60]);
        assert_eq!(raw[20], 0x00);
        assert_eq!(raw[21], 0x21);
    }

    #[test]
    fn test_encoded_wind_passes_validation() {
        let raw = encode_wind(&wind(), Some(&Sum8)).unwrap();
        let frame = FrameValidator::default().validate(Bytes::from(raw)).unwrap();

        let reading = PayloadDecoder::default().decode(&frame).unwrap();
        assert_eq!(reading, Reading::Wind(wind()));
    }

    #[test]
    fn test_encode_rain_layout() {
        let rain = RainReading {
            gateway_address: 1,
            terminal_address: 1,
            sensor_address: 3,
            avg_rain_per_minute: 1.0,
            avg_rain_per_hour: 0.0,
            avg_rain_per_day: 0.0,
            total_rainfall: 0.0,
            battery: 90,
            status: 0,
        };
        let raw = encode_rain(&rain, Some(&Sum8));

        assert_eq!(raw.len(), RAIN_FRAME_WIDTH);
        assert_eq!(raw[5], 25);
        assert_eq!(&raw[6..10], &[0x3F, 0x80, 0x00, 0x00]);
        assert_eq!(raw[24], Sum8.compute(&raw[2..24]));
    }
}
