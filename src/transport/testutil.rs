//! Scripted in-memory link for unit tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use bytes::Bytes;
use tokio::sync::Notify;
use tokio::time::Instant;

use super::error::{Result, TransportError};
use super::link::{InboundDatagram, ProbeLink};
use super::queue::ReceiveQueue;

type Responder = Box<dyn Fn(&[u8]) -> Vec<Vec<u8>> + Send + Sync>;

/// A link whose peer is a closure: each send queues whatever replies the
/// script returns for the transmitted frame.
pub(crate) struct MockLink {
    queue: ReceiveQueue,
    responder: Responder,
    pub(crate) closed: AtomicBool,
    shutdown: Notify,
    sends: AtomicU32,
}

impl MockLink {
    /// A peer that never answers.
    pub(crate) fn silent() -> Self {
        Self::replying(|_| Vec::new())
    }

    /// A peer that answers every send with the scripted datagrams.
    pub(crate) fn replying(
        responder: impl Fn(&[u8]) -> Vec<Vec<u8>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            queue: ReceiveQueue::new(64),
            responder: Box::new(responder),
            closed: AtomicBool::new(false),
            shutdown: Notify::new(),
            sends: AtomicU32::new(0),
        }
    }

    /// Queue a datagram as if it had arrived unsolicited.
    pub(crate) fn inject(&self, bytes: Vec<u8>) {
        self.queue.push(datagram(bytes));
    }

    /// Frames transmitted so far.
    pub(crate) fn send_count(&self) -> u32 {
        self.sends.load(Ordering::SeqCst)
    }
}

fn datagram(bytes: Vec<u8>) -> InboundDatagram {
    let source: SocketAddr = "127.0.0.1:8889".parse().expect("static address");
    InboundDatagram {
        bytes: Bytes::from(bytes),
        source,
        received_at: Instant::now(),
    }
}

impl ProbeLink for MockLink {
    async fn send(&self, bytes: &[u8]) -> Result<()> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        self.sends.fetch_add(1, Ordering::SeqCst);
        for reply in (self.responder)(bytes) {
            self.queue.push(datagram(reply));
        }
        Ok(())
    }

    async fn receive(&self, deadline: Instant) -> Result<Option<InboundDatagram>> {
        let shutdown = self.shutdown.notified();
        tokio::pin!(shutdown);
        shutdown.as_mut().enable();

        if self.is_closed() {
            return Err(TransportError::Closed);
        }

        tokio::select! {
            datagram = self.queue.recv_before(deadline) => Ok(datagram),
            () = &mut shutdown => Err(TransportError::Closed),
        }
    }

    fn flush_pending(&self) {
        self.queue.flush();
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.shutdown.notify_waiters();
        self.queue.wake();
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
