//! Telegram decoding core
//!
//! Bytes flow through four stages:
//! - **assembler**: recovers frame boundaries from an arbitrarily chunked stream
//! - **validator**: checks markers, width and checksum
//! - **payload**: turns a valid frame into a typed `Reading`
//! - **encode**: the reverse direction, for synthetic producers
//!
//! None of these stages perform I/O.

pub mod assembler;
pub mod encode;
mod error;
pub mod frame;
pub mod payload;
pub mod validator;

pub use assembler::{CandidateFrame, FrameAssembler, Verdict};
pub use error::{DecodeError, FormatError};
pub use frame::{Frame, SensorType};
pub use payload::{
    PayloadDecoder, RainReading, Reading, RoutingKey, SoilProbe, SoilReading, StoredReading,
    WindReading,
};
pub use validator::FrameValidator;
