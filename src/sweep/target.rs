//! Scan target description.

use std::net::SocketAddr;
use std::ops::RangeInclusive;

/// The device under investigation and the opcode space to probe.
///
/// Built once from operator input and immutable for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    /// Device address and port.
    pub peer: SocketAddr,
    /// Opcodes to probe, swept in ascending order.
    pub opcodes: RangeInclusive<u8>,
}

impl ScanTarget {
    /// Target the full opcode space `0x00..=0xFF`.
    #[must_use]
    pub fn new(peer: SocketAddr) -> Self {
        Self {
            peer,
            opcodes: 0x00..=0xFF,
        }
    }

    /// Restrict the sweep to a sub-range.
    #[must_use]
    pub fn with_opcodes(mut self, opcodes: RangeInclusive<u8>) -> Self {
        self.opcodes = opcodes;
        self
    }

    /// Number of opcodes the sweep will attempt.
    #[must_use]
    pub fn opcode_count(&self) -> usize {
        self.opcodes.clone().count()
    }
}
