//! Per-opcode scan outcome.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;

use crate::protocol::{Frame, FrameError};

/// Outcome classification for one probed opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ScanStatus {
    /// Reply decoded with a valid checksum.
    Valid,
    /// Reply received but failed structural or checksum validation.
    InvalidFmt,
    /// No reply within the retry budget.
    Timeout,
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Valid => "VALID",
            Self::InvalidFmt => "INVALID_FMT",
            Self::Timeout => "TIMEOUT",
        };
        write!(f, "{name}")
    }
}

/// Finer-grained cause behind an `INVALID_FMT` classification.
///
/// The three-state [`ScanStatus`] keeps the operator table readable; this
/// rides alongside for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DecodeFailure {
    /// Buffer shorter than declared (or under the 4-byte minimum).
    Truncated,
    /// Sync byte did not match the configured value.
    HeaderMismatch,
    /// Frame parsed but its checksum disagreed with the configured fold.
    ChecksumMismatch,
}

impl DecodeFailure {
    pub(crate) fn from_error(err: &FrameError) -> Option<Self> {
        match err {
            FrameError::Truncated { .. } => Some(Self::Truncated),
            FrameError::HeaderMismatch { .. } => Some(Self::HeaderMismatch),
            FrameError::ChecksumMismatch { .. } => Some(Self::ChecksumMismatch),
            FrameError::PayloadTooLarge { .. } => None,
        }
    }
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Truncated => "truncated",
            Self::HeaderMismatch => "header mismatch",
            Self::ChecksumMismatch => "checksum mismatch",
        };
        write!(f, "{name}")
    }
}

/// Structured evidence for one probed opcode.
///
/// Append-only once emitted; the sweep yields exactly one per opcode, in
/// opcode order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ScanRecord {
    /// Opcode that was probed.
    pub opcode: u8,
    /// Outcome classification.
    pub status: ScanStatus,
    /// Declared reply length for valid frames, raw datagram length for
    /// invalid ones, `0` on timeout.
    pub rx_length: usize,
    /// Reply bytes beyond the declared frame end.
    pub trailing_bytes: usize,
    /// Opcode carried by the reply, when one could be parsed.
    pub rx_opcode: Option<u8>,
    /// Reply payload, when one could be parsed.
    pub payload: Option<Bytes>,
    /// Raw reply bytes; kept even on checksum failure.
    pub raw: Option<Bytes>,
    /// Why an `INVALID_FMT` reply failed to validate.
    pub failure: Option<DecodeFailure>,
    /// Wall-clock time from first transmit to classification.
    pub elapsed: Duration,
}

impl ScanRecord {
    /// Record for an opcode that never answered.
    #[must_use]
    pub(crate) fn timeout(opcode: u8, elapsed: Duration) -> Self {
        Self {
            opcode,
            status: ScanStatus::Timeout,
            rx_length: 0,
            trailing_bytes: 0,
            rx_opcode: None,
            payload: None,
            raw: None,
            failure: None,
            elapsed,
        }
    }

    /// Record for a reply that decoded with a valid checksum.
    pub(crate) fn valid(opcode: u8, frame: &Frame, elapsed: Duration) -> Self {
        Self {
            opcode,
            status: ScanStatus::Valid,
            rx_length: usize::from(frame.length()),
            trailing_bytes: frame.trailing_len(),
            rx_opcode: Some(frame.opcode()),
            payload: Some(frame.payload().clone()),
            raw: Some(frame.raw().clone()),
            failure: None,
            elapsed,
        }
    }

    /// Record for a well-formed frame whose checksum disagreed. All parsed
    /// fields are preserved for inspection.
    pub(crate) fn checksum_mismatch(
        opcode: u8,
        frame: &Frame,
        raw_len: usize,
        elapsed: Duration,
    ) -> Self {
        Self {
            opcode,
            status: ScanStatus::InvalidFmt,
            rx_length: raw_len,
            trailing_bytes: frame.trailing_len(),
            rx_opcode: Some(frame.opcode()),
            payload: Some(frame.payload().clone()),
            raw: Some(frame.raw().clone()),
            failure: Some(DecodeFailure::ChecksumMismatch),
            elapsed,
        }
    }

    /// Record for a reply that failed structural parsing. Only the raw
    /// bytes are available.
    pub(crate) fn structural_failure(
        opcode: u8,
        raw: Bytes,
        failure: Option<DecodeFailure>,
        elapsed: Duration,
    ) -> Self {
        Self {
            opcode,
            status: ScanStatus::InvalidFmt,
            rx_length: raw.len(),
            trailing_bytes: 0,
            rx_opcode: None,
            payload: None,
            raw: Some(raw),
            failure,
            elapsed,
        }
    }
}
