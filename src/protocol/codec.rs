//! Frame codec (encode/decode)
//!
//! Pure pack/unpack over byte buffers. No I/O and no shared state: every
//! call takes the [`FrameLayout`] it should assume, so concurrent callers
//! and repeated re-parameterization are both safe.

use bytes::Bytes;

use super::{Frame, FrameError, FrameLayout, MIN_FRAME_SIZE, Result};

/// Encode a request frame.
///
/// # Format
///
/// ```text
/// [SYNC (1)] [LENGTH (1)] [OPCODE (1)] [PAYLOAD (N)] [CHECKSUM (1)]
/// ```
///
/// # Errors
///
/// Returns [`FrameError::PayloadTooLarge`] when the payload cannot be
/// counted by the single length byte under the active layout.
pub fn encode(opcode: u8, payload: &[u8], layout: &FrameLayout) -> Result<Vec<u8>> {
    let length = layout
        .length_field
        .encode_len(payload.len())
        .ok_or(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: layout.max_payload(),
        })?;

    let mut bytes = Vec::with_capacity(MIN_FRAME_SIZE + payload.len());
    bytes.push(layout.sync);
    bytes.push(length);
    bytes.push(opcode);
    bytes.extend_from_slice(payload);

    let checksum = layout
        .checksum
        .compute(&bytes[layout.checksum_range.start_offset()..]);
    bytes.push(checksum);

    Ok(bytes)
}

/// Decode a response frame.
///
/// Validation order: minimum size, sync byte, declared length, checksum.
/// A buffer longer than the declared frame is valid; the surplus is kept on
/// the frame as trailing bytes (devices routinely over-send). A checksum
/// mismatch is reported as an error, but the parsed frame is carried inside
/// [`FrameError::ChecksumMismatch`] so every field stays inspectable.
///
/// # Errors
///
/// [`FrameError::Truncated`], [`FrameError::HeaderMismatch`], or
/// [`FrameError::ChecksumMismatch`].
pub fn decode(bytes: Bytes, layout: &FrameLayout) -> Result<Frame> {
    if bytes.len() < MIN_FRAME_SIZE {
        return Err(FrameError::Truncated {
            needed: MIN_FRAME_SIZE,
            got: bytes.len(),
        });
    }

    let header = bytes[0];
    if header != layout.sync {
        return Err(FrameError::HeaderMismatch {
            expected: layout.sync,
            found: header,
        });
    }

    let length = bytes[1];
    let payload_len = layout.length_field.payload_len(length);
    // sync + length + opcode + payload + checksum
    let frame_len = 3 + payload_len + 1;

    if bytes.len() < frame_len {
        return Err(FrameError::Truncated {
            needed: frame_len,
            got: bytes.len(),
        });
    }

    let raw = bytes.slice(..frame_len);
    let trailing = bytes.slice(frame_len..);

    let opcode = raw[2];
    let payload = raw.slice(3..3 + payload_len);
    let received = raw[frame_len - 1];

    let computed = layout
        .checksum
        .compute(&raw[layout.checksum_range.start_offset()..frame_len - 1]);

    let frame = Frame::from_parts(header, length, opcode, payload, received, raw, trailing);

    if computed != received {
        return Err(FrameError::ChecksumMismatch {
            expected: computed,
            found: received,
            frame: Box::new(frame),
        });
    }

    Ok(frame)
}
