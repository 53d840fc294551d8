//! Codec error types.

use thiserror::Error;

use super::Frame;

/// Frame encode/decode errors.
#[derive(Error, Debug)]
pub enum FrameError {
    /// Payload does not fit the length byte
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Payload size
        size: usize,
        /// Maximum allowed under the active layout
        max: usize,
    },

    /// Buffer shorter than the frame it declares (or than the 4-byte minimum)
    #[error("truncated frame: need {needed} bytes, got {got}")]
    Truncated {
        /// Bytes required
        needed: usize,
        /// Bytes available
        got: usize,
    },

    /// First byte is not the configured sync value
    #[error("header mismatch: expected {expected:#04x}, got {found:#04x}")]
    HeaderMismatch {
        /// Configured sync byte
        expected: u8,
        /// Byte actually received
        found: u8,
    },

    /// Recomputed checksum differs from the one on the wire.
    ///
    /// The parsed frame rides along: a wrong checksum is often itself
    /// evidence (e.g. the device folds over a different range than the
    /// layout assumes), so the fields must stay inspectable.
    #[error("checksum mismatch: expected {expected:#04x}, got {found:#04x}")]
    ChecksumMismatch {
        /// Checksum recomputed over the configured range
        expected: u8,
        /// Checksum byte received
        found: u8,
        /// Partially trusted frame
        frame: Box<Frame>,
    },
}

impl FrameError {
    /// Whether the failure is structural (size/sync) rather than a checksum
    /// disagreement over an otherwise well-formed frame.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        !matches!(self, Self::ChecksumMismatch { .. })
    }
}

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, FrameError>;
