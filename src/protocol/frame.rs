//! Decoded frame representation.

use bytes::Bytes;

/// A frame parsed off the wire.
///
/// # Wire Format
///
/// ```text
/// [SYNC (1)] [LENGTH (1)] [OPCODE (1)] [PAYLOAD (N)] [CHECKSUM (1)]
/// ```
///
/// Frames are immutable once constructed. A `Frame` is returned even when
/// the checksum does not validate (inside the error), because during
/// protocol discovery the fields of a badly-checksummed reply are still
/// evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    header: u8,
    length: u8,
    opcode: u8,
    payload: Bytes,
    checksum: u8,
    raw: Bytes,
    trailing: Bytes,
}

impl Frame {
    /// Assemble a frame from already-validated parts. Codec-internal.
    pub(crate) fn from_parts(
        header: u8,
        length: u8,
        opcode: u8,
        payload: Bytes,
        checksum: u8,
        raw: Bytes,
        trailing: Bytes,
    ) -> Self {
        Self {
            header,
            length,
            opcode,
            payload,
            checksum,
            raw,
            trailing,
        }
    }

    /// Sync byte as received.
    #[must_use]
    pub const fn header(&self) -> u8 {
        self.header
    }

    /// Declared length byte as received.
    #[must_use]
    pub const fn length(&self) -> u8 {
        self.length
    }

    /// Opcode byte.
    #[must_use]
    pub const fn opcode(&self) -> u8 {
        self.opcode
    }

    /// Payload bytes (may be empty).
    #[must_use]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Checksum byte as received, whether or not it validated.
    #[must_use]
    pub const fn checksum(&self) -> u8 {
        self.checksum
    }

    /// The frame's own bytes, up to and including the checksum.
    #[must_use]
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Bytes the device sent beyond the declared frame end.
    #[must_use]
    pub fn trailing(&self) -> &Bytes {
        &self.trailing
    }

    /// Number of trailing bytes.
    #[must_use]
    pub fn trailing_len(&self) -> usize {
        self.trailing.len()
    }
}
