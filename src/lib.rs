//! opsweep - Opcode sweep harness for reverse-engineering UDP hardware protocols
//!
//! Many drones, IoT relays, and WiFi cameras speak undocumented
//! request/response protocols over UDP: a sync byte, a length, an opcode, a
//! payload, a one-byte checksum. This library does not *use* such a
//! protocol, it *discovers* one: it probes the opcode space, tolerates
//! silence and malformed replies, and records enough structural detail
//! (length, opcode, checksum validity, trailing bytes) to infer the wire
//! format empirically.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use opsweep::protocol::FrameLayout;
//! use opsweep::sweep::{ScanTarget, SweepConfig, SweepEngine};
//! use opsweep::transport::{ProbeSession, SessionConfig, UdpLink, UdpLinkConfig};
//!
//! # async fn scan() -> Result<(), Box<dyn std::error::Error>> {
//! let target = ScanTarget::new("192.168.4.1:8889".parse()?);
//! let link = UdpLink::open(target.peer, UdpLinkConfig::default()).await?;
//! let session = ProbeSession::new(link, SessionConfig::default())?;
//! let engine = SweepEngine::new(session, FrameLayout::default(), SweepConfig::default());
//!
//! let mut sweep = engine.sweep(&target)?;
//! while let Some(record) = sweep.next_record().await {
//!     println!("{:?}", record?);
//! }
//! engine.close();
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//!
//! - **Codec** ([`protocol`]) - pure pack/unpack; sync byte, checksum
//!   algorithm, checksum range, and length semantics are all configuration
//! - **Transport** ([`transport`]) - socket ownership, a receive loop that
//!   never stops listening, noise filtering, bounded drop-oldest queueing,
//!   and a serialized retry/timeout session
//! - **Sweep** ([`sweep`]) - deterministic ascending probe of the opcode
//!   range, yielding one structured [`sweep::ScanRecord`] per opcode as a
//!   lazy sequence
//!
//! The harness transmits whatever it is told to; it does not enforce
//! protocol safety, and it surfaces evidence rather than guessing
//! semantics.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod metrics;
pub mod protocol;
pub mod sweep;
pub mod transport;

pub use protocol::{Checksum, ChecksumRange, Frame, FrameError, FrameLayout, LengthField};
pub use sweep::{ScanRecord, ScanStatus, ScanTarget, SweepConfig, SweepEngine, SweepError};
pub use transport::{
    InboundDatagram, ProbeLink, ProbeSession, SessionConfig, TransportError, UdpLink,
    UdpLinkConfig,
};

/// Default UDP command port used by the devices this harness grew up on.
pub const DEFAULT_PORT: u16 = 8889;
