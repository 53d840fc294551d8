//! Transport/session layer: socket ownership, retry policy, noise filtering.
//!
//! Split the way the harness needs it swapped: [`ProbeLink`] is the
//! physical medium (UDP today, serial or a relay tomorrow), and
//! [`ProbeSession`] is the medium-independent retry/timeout discipline
//! layered on top.

mod error;
mod link;
mod queue;
mod session;
mod udp;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{Result, TransportError};
pub use link::{InboundDatagram, ProbeLink};
pub use queue::{DEFAULT_QUEUE_CAPACITY, ReceiveQueue};
pub use session::{ProbeSession, SessionConfig};
pub use udp::{MAX_DATAGRAM_SIZE, UdpLink, UdpLinkConfig};
