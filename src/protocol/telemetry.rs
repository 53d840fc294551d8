//! Strict telemetry payload decoder.
//!
//! Once a sweep identifies a telemetry opcode, its payload can be decoded
//! against the known report shape. The decoder is deliberately strict: any
//! size other than the exact report size is rejected rather than guessed at.

use thiserror::Error;

/// Exact size of a telemetry payload in bytes.
pub const TELEMETRY_PAYLOAD_LEN: usize = 8;

/// Telemetry decode errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TelemetryError {
    /// Payload is not exactly [`TELEMETRY_PAYLOAD_LEN`] bytes
    #[error("telemetry size mismatch: expected {TELEMETRY_PAYLOAD_LEN} bytes, got {got}")]
    SizeMismatch {
        /// Bytes received
        got: usize,
    },
}

/// Decoded telemetry report.
///
/// # Wire Format (little-endian)
///
/// ```text
/// [BATTERY % (u8)] [VOLTAGE mV (u16)] [ALTITUDE m (f32)] [ERROR FLAGS (u8)]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TelemetryReport {
    /// Battery level in percent.
    pub battery_pct: u8,
    /// Pack voltage in millivolts.
    pub voltage_mv: u16,
    /// Altitude in meters.
    pub altitude_m: f32,
    /// Device error flag bits.
    pub error_flags: u8,
}

impl TelemetryReport {
    /// Parse a telemetry payload.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::SizeMismatch`] unless the payload is
    /// exactly [`TELEMETRY_PAYLOAD_LEN`] bytes.
    pub fn decode(payload: &[u8]) -> Result<Self, TelemetryError> {
        if payload.len() != TELEMETRY_PAYLOAD_LEN {
            return Err(TelemetryError::SizeMismatch { got: payload.len() });
        }

        Ok(Self {
            battery_pct: payload[0],
            voltage_mv: u16::from_le_bytes(payload[1..3].try_into().expect("sized above")),
            altitude_m: f32::from_le_bytes(payload[3..7].try_into().expect("sized above")),
            error_flags: payload[7],
        })
    }
}
