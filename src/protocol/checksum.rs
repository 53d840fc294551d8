//! Single-byte checksum algorithms observed on embedded UDP devices.
//!
//! The algorithm is part of the wire format under investigation, so it is
//! configuration rather than a constant. All algorithms fold an arbitrary
//! byte range down to one byte.

/// Checksum algorithm applied over the configured byte range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Checksum {
    /// XOR of every byte in the range. The most common scheme on cheap
    /// drone/IoT firmware.
    #[default]
    XorFold,
    /// Additive sum, truncated to 8 bits.
    Sum8,
    /// CRC-8 with polynomial 0x07, initial value 0x00.
    Crc8,
}

impl Checksum {
    /// Compute the checksum byte for `data`.
    #[must_use]
    pub fn compute(self, data: &[u8]) -> u8 {
        match self {
            Self::XorFold => data.iter().fold(0u8, |acc, b| acc ^ b),
            Self::Sum8 => data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b)),
            Self::Crc8 => crc8(data),
        }
    }
}

fn crc8(data: &[u8]) -> u8 {
    const POLY: u8 = 0x07;

    let mut crc = 0u8;
    for byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ POLY
            } else {
                crc << 1
            };
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_fold_matches_manual() {
        assert_eq!(Checksum::XorFold.compute(&[0x55, 0x01, 0x10]), 0x44);
        assert_eq!(Checksum::XorFold.compute(&[]), 0x00);
    }

    #[test]
    fn xor_fold_self_cancels() {
        assert_eq!(Checksum::XorFold.compute(&[0xAA, 0xAA]), 0x00);
    }

    #[test]
    fn sum8_wraps() {
        assert_eq!(Checksum::Sum8.compute(&[0xFF, 0x02]), 0x01);
    }

    #[test]
    fn crc8_known_vector() {
        // CRC-8/SMBUS check value for "123456789".
        assert_eq!(Checksum::Crc8.compute(b"123456789"), 0xF4);
    }
}
