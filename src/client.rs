//! Synthetic terminal
//!
//! Connects to a gateway and sends generated wind or rain telegrams. Values
//! are a pure function of the sequence number, so a run is reproducible and
//! the receiving side can be checked against [`wind_reading`] /
//! [`rain_reading`].

use crate::codec::Checksum;
use crate::constants::SYNTHETIC_GATEWAY_ADDR;
use crate::error::{GatewayError, Result};
use crate::telegram::encode::{encode_rain, encode_wind};
use crate::telegram::{RainReading, WindReading};
use clap::ValueEnum;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info};

/// Telegram type the synthetic terminal sends
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SendKind {
    Wind,
    Rain,
}

#[derive(Debug, Clone)]
pub struct SendOptions {
    pub addr: String,
    pub kind: SendKind,
    pub count: u32,
    pub interval: Duration,
    /// Write each telegram in two halves
    pub split: bool,
    pub terminal_address: u8,
    pub sensor_address: u8,
}

/// Wind reading for sequence number `seq`
pub fn wind_reading(seq: u32, terminal: u8, sensor: u8) -> WindReading {
    let seq = u64::from(seq);
    let speed = |offset: u64| ((seq + offset) % 40) as f64 * 0.25;
    let dir = |offset: u64| ((seq * 15 + offset) % 360) as u16;
    WindReading {
        gateway_address: SYNTHETIC_GATEWAY_ADDR,
        terminal_address: terminal,
        sensor_address: sensor,
        avg_speed_3s: speed(0),
        wind_dir_3s: dir(0),
        avg_speed_2m: speed(1),
        wind_dir_2m: dir(90),
        avg_speed_10m: speed(2),
        wind_dir_10m: dir(180),
        battery: (100 - seq % 100) as u8,
        status: 0,
    }
}

/// Rain reading for sequence number `seq`
pub fn rain_reading(seq: u32, terminal: u8, sensor: u8) -> RainReading {
    let step = (seq % 1000) as f32;
    RainReading {
        gateway_address: SYNTHETIC_GATEWAY_ADDR,
        terminal_address: terminal,
        sensor_address: sensor,
        avg_rain_per_minute: step * 0.125,
        avg_rain_per_hour: step * 0.5,
        avg_rain_per_day: step * 2.0,
        total_rainfall: step * 10.0,
        battery: (100 - seq % 100) as u8,
        status: 0,
    }
}

/// Encoded telegram for sequence number `seq`
pub fn telegram(
    kind: SendKind,
    seq: u32,
    terminal: u8,
    sensor: u8,
    checksum: Option<&dyn Checksum>,
) -> Result<Vec<u8>> {
    Ok(match kind {
        SendKind::Wind => encode_wind(&wind_reading(seq, terminal, sensor), checksum)?,
        SendKind::Rain => encode_rain(&rain_reading(seq, terminal, sensor), checksum),
    })
}

/// Connect and send `opts.count` telegrams, stopping early on shutdown
pub async fn run(
    opts: &SendOptions,
    checksum: Option<Arc<dyn Checksum>>,
    shutdown: Arc<AtomicBool>,
) -> Result<u32> {
    let connect_err = |e| GatewayError::Connect {
        addr: opts.addr.clone(),
        source: e,
    };
    let mut stream = TcpStream::connect(&opts.addr).await.map_err(connect_err)?;
    info!(addr = %opts.addr, kind = ?opts.kind, count = opts.count, "Connected");

    let mut sent = 0;
    for seq in 0..opts.count {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }
        if seq > 0 {
            tokio::time::sleep(opts.interval).await;
        }

        let frame = telegram(
            opts.kind,
            seq,
            opts.terminal_address,
            opts.sensor_address,
            checksum.as_deref(),
        )?;
        if opts.split {
            let (head, tail) = frame.split_at(frame.len() / 2);
            stream.write_all(head).await.map_err(connect_err)?;
            stream.flush().await.map_err(connect_err)?;
            stream.write_all(tail).await.map_err(connect_err)?;
        } else {
            stream.write_all(&frame).await.map_err(connect_err)?;
        }
        stream.flush().await.map_err(connect_err)?;

        debug!(seq, bytes = frame.len(), "Telegram sent");
        sent += 1;
    }

    stream.shutdown().await.map_err(connect_err)?;
    info!(sent, "Done");
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{ScaledIntMode, Sum8};
    use crate::telegram::{FrameValidator, PayloadDecoder, Reading};
    use bytes::Bytes;

    fn decode(frame: Vec<u8>) -> Reading {
        let frame = FrameValidator::default().validate(Bytes::from(frame)).unwrap();
        PayloadDecoder::new(ScaledIntMode::Strict).decode(&frame).unwrap()
    }

    #[test]
    fn test_wind_sequence_decodes_exactly() {
        for seq in [0, 1, 39, 40, 123, 9999] {
            let frame = telegram(SendKind::Wind, seq, 2, 5, Some(&Sum8)).unwrap();
            assert_eq!(decode(frame), Reading::Wind(wind_reading(seq, 2, 5)));
        }
    }

    #[test]
    fn test_rain_sequence_decodes_exactly() {
        for seq in [0, 7, 999, 1000] {
            let frame = telegram(SendKind::Rain, seq, 1, 3, Some(&Sum8)).unwrap();
            assert_eq!(decode(frame), Reading::Rain(rain_reading(seq, 1, 3)));
        }
    }

    #[test]
    fn test_sequence_near_u32_max_encodes() {
        for seq in [u32::MAX - 1, u32::MAX] {
            let frame = telegram(SendKind::Wind, seq, 1, 1, Some(&Sum8)).unwrap();
            assert_eq!(decode(frame), Reading::Wind(wind_reading(seq, 1, 1)));
        }
        let w = wind_reading(u32::MAX, 1, 1);
        assert_eq!(w.wind_dir_3s, ((u64::from(u32::MAX) * 15) % 360) as u16);
        assert!(w.avg_speed_10m < 10.0);
    }

    #[test]
    fn test_values_are_deterministic() {
        assert_eq!(wind_reading(17, 1, 1), wind_reading(17, 1, 1));
        assert_ne!(wind_reading(17, 1, 1), wind_reading(18, 1, 1));
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Bind then drop to get a port nobody listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let opts = SendOptions {
            addr: format!("127.0.0.1:{}", port),
            kind: SendKind::Wind,
            count: 1,
            interval: Duration::ZERO,
            split: false,
            terminal_address: 1,
            sensor_address: 1,
        };

        let err = run(&opts, None, Arc::new(AtomicBool::new(false)))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Connect { .. }));
    }
}
