//! Frame layout configuration.
//!
//! Devices disagree about the sync byte, what the checksum covers, and what
//! the length byte counts. The codec takes the whole layout as a value so a
//! scan can be re-run under a different hypothesis without touching the
//! transport or the sweep engine.

use super::checksum::Checksum;

/// Default sync byte recognized at the start of a frame.
pub const DEFAULT_SYNC_BYTE: u8 = 0x55;

/// First byte covered by the checksum fold.
///
/// The fold always ends at the last payload byte; only the starting point
/// varies between firmwares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChecksumRange {
    /// Opcode and payload only, excluding sync and length bytes.
    #[default]
    FromOpcode,
    /// Length byte onward.
    FromLength,
    /// Entire frame body including the sync byte.
    FromHeader,
}

impl ChecksumRange {
    /// Byte offset within the frame where the fold starts.
    #[must_use]
    pub const fn start_offset(self) -> usize {
        match self {
            Self::FromHeader => 0,
            Self::FromLength => 1,
            Self::FromOpcode => 2,
        }
    }
}

/// What the length byte counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LengthField {
    /// Opcode plus payload (`length = 1 + payload len`).
    #[default]
    OpcodeAndPayload,
    /// Payload only (`length = payload len`).
    PayloadOnly,
}

impl LengthField {
    /// Encode a payload length into the length byte's value.
    ///
    /// Returns `None` when the value does not fit in one byte.
    #[must_use]
    pub fn encode_len(self, payload_len: usize) -> Option<u8> {
        let counted = match self {
            Self::OpcodeAndPayload => payload_len.checked_add(1)?,
            Self::PayloadOnly => payload_len,
        };
        u8::try_from(counted).ok()
    }

    /// Payload length implied by the length byte's value.
    #[must_use]
    pub const fn payload_len(self, length: u8) -> usize {
        match self {
            Self::OpcodeAndPayload => (length as usize).saturating_sub(1),
            Self::PayloadOnly => length as usize,
        }
    }
}

/// Complete wire-format description for one device hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    /// Sync byte expected at offset 0.
    pub sync: u8,
    /// Checksum algorithm.
    pub checksum: Checksum,
    /// Byte range covered by the checksum.
    pub checksum_range: ChecksumRange,
    /// Semantics of the length byte.
    pub length_field: LengthField,
}

impl Default for FrameLayout {
    fn default() -> Self {
        Self {
            sync: DEFAULT_SYNC_BYTE,
            checksum: Checksum::default(),
            checksum_range: ChecksumRange::default(),
            length_field: LengthField::default(),
        }
    }
}

impl FrameLayout {
    /// Maximum payload length representable under this layout.
    #[must_use]
    pub const fn max_payload(&self) -> usize {
        match self.length_field {
            LengthField::OpcodeAndPayload => u8::MAX as usize - 1,
            LengthField::PayloadOnly => u8::MAX as usize,
        }
    }
}
