//! Byte-level encodings shared by the telegram layers
//!
//! - **numeric**: scaled digit-pair integers and big-endian binary32 fields
//! - **checksum**: pluggable frame checksum algorithms
//!
//! # Adding a checksum
//!
//! 1. Implement the `Checksum` trait in `checksum.rs`
//! 2. Add a `ChecksumMode` variant mapping to it
//! 3. No other changes needed

pub mod checksum;
pub mod numeric;

pub use checksum::{Checksum, ChecksumMode, Sum8, Xor8};
pub use numeric::{decode_binary32, decode_scaled_int, ScaledIntMode};
