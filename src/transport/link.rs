//! Physical-medium capability contract.
//!
//! The codec and the sweep engine never touch a socket: they talk to a
//! [`ProbeLink`], which is "send bytes to the bound peer, receive bytes
//! from it, suspending until data or a deadline". UDP is the first
//! implementation; a serial or relay link slots in behind the same trait.

use std::net::SocketAddr;

use bytes::Bytes;
use tokio::time::Instant;

use super::error::Result;

/// A raw datagram received from the target.
///
/// Owned by the link until queued, then by the queue until a consumer
/// takes it.
#[derive(Debug, Clone)]
pub struct InboundDatagram {
    /// Raw datagram bytes.
    pub bytes: Bytes,
    /// Address the datagram arrived from.
    pub source: SocketAddr,
    /// When the receive loop pulled it off the socket.
    pub received_at: Instant,
}

impl InboundDatagram {
    /// Datagram length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the datagram carries no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One bound channel to one target device.
///
/// Implementations own the physical resource, run their own receive loop,
/// and filter out traffic that did not come from the bound peer before it
/// reaches the caller.
pub trait ProbeLink: Send + Sync {
    /// Transmit raw bytes to the bound peer.
    fn send(&self, bytes: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Wait for the next datagram from the peer.
    ///
    /// Resolves to `Ok(None)` once `deadline` passes with nothing queued,
    /// and to `Err(Closed)` promptly if the link is closed mid-wait.
    fn receive(&self, deadline: Instant) -> impl Future<Output = Result<Option<InboundDatagram>>> + Send;

    /// Discard any datagrams already queued.
    ///
    /// Called before each fresh request so a stale reply to an earlier
    /// probe cannot be mistaken for the new one.
    fn flush_pending(&self);

    /// Release the underlying resource and wake any blocked receiver.
    ///
    /// Must be idempotent and must not leave the medium held afterwards.
    fn close(&self);

    /// Whether [`close`](ProbeLink::close) has been called.
    fn is_closed(&self) -> bool;
}
