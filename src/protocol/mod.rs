//! Frame codec and wire-format configuration.
//!
//! This module is the pure half of the harness: packing and unpacking the
//! length-prefixed, checksummed frame devices speak, with every layout
//! detail (sync byte, checksum algorithm and range, length semantics) held
//! in configuration rather than constants.

mod checksum;
mod codec;
mod error;
mod frame;
mod layout;
mod telemetry;

pub use checksum::Checksum;
pub use codec::{decode, encode};
pub use error::{FrameError, Result};
pub use frame::Frame;
pub use layout::{ChecksumRange, DEFAULT_SYNC_BYTE, FrameLayout, LengthField};
pub use telemetry::{TELEMETRY_PAYLOAD_LEN, TelemetryError, TelemetryReport};

/// Minimum size of a parseable frame: sync + length + opcode + checksum.
pub const MIN_FRAME_SIZE: usize = 4;

/// Byte offset of the opcode within a frame.
pub const OPCODE_OFFSET: usize = 2;
