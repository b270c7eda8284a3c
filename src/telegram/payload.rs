//! Payload decoding: validated frame to typed reading
//!
//! Decoding is a pure function. A frame either produces a complete reading
//! or a `DecodeError`; no field is ever defaulted.

use super::error::DecodeError;
use super::frame::{Frame, SensorType};
use crate::codec::numeric::{decode_binary32, decode_centi, decode_scaled_int, ScaledIntMode};
use serde::Serialize;

/// Routing key sinks use to pick a per-terminal destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RoutingKey {
    pub terminal_address: u8,
    pub sensor_address: u8,
}

impl RoutingKey {
    /// Per-terminal table name, e.g. `wind0102`
    pub fn table_name(&self, sensor_type: SensorType) -> String {
        format!(
            "{}{:02}{:02}",
            sensor_type.label(),
            self.terminal_address,
            self.sensor_address
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindReading {
    pub gateway_address: u8,
    pub terminal_address: u8,
    pub sensor_address: u8,
    /// m/s, two implied decimals on the wire
    pub avg_speed_3s: f64,
    /// degrees
    pub wind_dir_3s: u16,
    pub avg_speed_2m: f64,
    pub wind_dir_2m: u16,
    pub avg_speed_10m: f64,
    pub wind_dir_10m: u16,
    /// percent
    pub battery: u8,
    pub status: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainReading {
    pub gateway_address: u8,
    pub terminal_address: u8,
    pub sensor_address: u8,
    pub avg_rain_per_minute: f32,
    pub avg_rain_per_hour: f32,
    pub avg_rain_per_day: f32,
    pub total_rainfall: f32,
    pub battery: u8,
    pub status: u8,
}

/// One soil probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SoilProbe {
    pub address: u8,
    pub humidity: u16,
    pub temperature: u16,
}

/// Soil telegram. Parsed, but never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoilReading {
    pub gateway_address: u8,
    pub terminal_address: u8,
    pub probes: [SoilProbe; 3],
    pub battery: u8,
    pub status: u8,
}

/// Decoded telegram
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reading {
    Wind(WindReading),
    Rain(RainReading),
    Soil(SoilReading),
    Unknown { sensor_type: u8 },
}

impl Reading {
    pub fn sensor_type(&self) -> SensorType {
        match self {
            Self::Wind(_) => SensorType::Wind,
            Self::Rain(_) => SensorType::Rain,
            Self::Soil(_) => SensorType::Soil,
            Self::Unknown { sensor_type } => SensorType::Unknown(*sensor_type),
        }
    }

    /// Readings that may be handed to storage
    pub fn into_stored(self) -> Result<StoredReading, Reading> {
        match self {
            Self::Wind(w) => Ok(StoredReading::Wind(w)),
            Self::Rain(r) => Ok(StoredReading::Rain(r)),
            other => Err(other),
        }
    }
}

/// The subset of readings a [`ReadingSink`](crate::dispatch::ReadingSink) accepts
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoredReading {
    Wind(WindReading),
    Rain(RainReading),
}

impl StoredReading {
    pub fn sensor_type(&self) -> SensorType {
        match self {
            Self::Wind(_) => SensorType::Wind,
            Self::Rain(_) => SensorType::Rain,
        }
    }

    pub fn routing_key(&self) -> RoutingKey {
        let (terminal_address, sensor_address) = match self {
            Self::Wind(w) => (w.terminal_address, w.sensor_address),
            Self::Rain(r) => (r.terminal_address, r.sensor_address),
        };
        RoutingKey {
            terminal_address,
            sensor_address,
        }
    }

    pub fn table_name(&self) -> String {
        self.routing_key().table_name(self.sensor_type())
    }
}

/// Turns validated frames into readings
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadDecoder {
    scaled_mode: ScaledIntMode,
}

impl PayloadDecoder {
    pub fn new(scaled_mode: ScaledIntMode) -> Self {
        Self { scaled_mode }
    }

    pub fn scaled_mode(&self) -> ScaledIntMode {
        self.scaled_mode
    }

    /// Decode a validated frame
    pub fn decode(&self, frame: &Frame) -> Result<Reading, DecodeError> {
        match frame.sensor_type() {
            SensorType::Wind => self.decode_wind(frame).map(Reading::Wind),
            SensorType::Rain => decode_rain(frame).map(Reading::Rain),
            SensorType::Soil => Ok(Reading::Soil(decode_soil(frame))),
            SensorType::Unknown(code) => Ok(Reading::Unknown { sensor_type: code }),
        }
    }

    fn decode_wind(&self, frame: &Frame) -> Result<WindReading, DecodeError> {
        let b = frame.as_bytes();
        let mode = self.scaled_mode;
        Ok(WindReading {
            gateway_address: frame.gateway_address(),
            terminal_address: frame.terminal_address(),
            sensor_address: frame.sensor_address(),
            avg_speed_3s: decode_centi(b[6], b[7], mode)?,
            wind_dir_3s: decode_scaled_int(b[8], b[9], mode)?,
            avg_speed_2m: decode_centi(b[10], b[11], mode)?,
            wind_dir_2m: decode_scaled_int(b[12], b[13], mode)?,
            avg_speed_10m: decode_centi(b[14], b[15], mode)?,
            wind_dir_10m: decode_scaled_int(b[16], b[17], mode)?,
            battery: b[18],
            status: b[19],
        })
    }
}

fn decode_rain(frame: &Frame) -> Result<RainReading, DecodeError> {
    let b = frame.as_bytes();
    Ok(RainReading {
        gateway_address: frame.gateway_address(),
        terminal_address: frame.terminal_address(),
        sensor_address: frame.sensor_address(),
        avg_rain_per_minute: decode_binary32(&b[6..10])?,
        avg_rain_per_hour: decode_binary32(&b[10..14])?,
        avg_rain_per_day: decode_binary32(&b[14..18])?,
        total_rainfall: decode_binary32(&b[18..22])?,
        battery: b[22],
        status: b[23],
    })
}

fn decode_soil(frame: &Frame) -> SoilReading {
    let b = frame.as_bytes();
    let probe = |at: usize| SoilProbe {
        address: b[at],
        humidity: u16::from_be_bytes([b[at + 1], b[at + 2]]),
        temperature: u16::from_be_bytes([b[at + 3], b[at + 4]]),
    };
    SoilReading {
        gateway_address: frame.gateway_address(),
        terminal_address: frame.terminal_address(),
        probes: [probe(4), probe(9), probe(14)],
        battery: b[19],
        status: b[20],
    }
}
