//! UDP implementation of the probe link.
//!
//! Owns the socket for one target device. The receive loop starts at
//! [`UdpLink::open`] and runs for the link's whole life, so late and
//! unsolicited replies are captured whether or not a request is currently
//! outstanding. Datagrams from any other source address are noise and are
//! dropped before they reach the queue.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::metrics::Metrics;

use super::error::{Result, TransportError};
use super::link::{InboundDatagram, ProbeLink};
use super::queue::{DEFAULT_QUEUE_CAPACITY, ReceiveQueue};

/// Largest datagram the receive loop will accept.
pub const MAX_DATAGRAM_SIZE: usize = 2048;

/// UDP link configuration.
#[derive(Debug, Clone)]
pub struct UdpLinkConfig {
    /// Local address to bind; an ephemeral port by default.
    pub bind_addr: SocketAddr,
    /// Receive queue capacity.
    pub queue_capacity: usize,
}

impl Default for UdpLinkConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:0".parse().expect("static address"),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// One bound UDP socket plus its background receive loop.
#[derive(Debug)]
pub struct UdpLink {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
    queue: Arc<ReceiveQueue>,
    shutdown: Arc<Notify>,
    closed: Arc<AtomicBool>,
    recv_task: Mutex<Option<JoinHandle<()>>>,
}

impl UdpLink {
    /// Bind a socket and start listening for traffic from `peer`.
    ///
    /// # Errors
    ///
    /// [`TransportError::Bind`] when the local address cannot be acquired,
    /// [`TransportError::InvalidConfig`] for a zero-capacity queue.
    pub async fn open(peer: SocketAddr, config: UdpLinkConfig) -> Result<Self> {
        if config.queue_capacity == 0 {
            return Err(TransportError::InvalidConfig {
                reason: "queue capacity must be positive",
            });
        }

        let socket = UdpSocket::bind(config.bind_addr)
            .await
            .map_err(|source| TransportError::Bind {
                addr: config.bind_addr,
                source,
            })?;
        let socket = Arc::new(socket);
        let queue = Arc::new(ReceiveQueue::new(config.queue_capacity));
        let shutdown = Arc::new(Notify::new());
        let closed = Arc::new(AtomicBool::new(false));

        info!(%peer, local = ?socket.local_addr().ok(), "udp link open");

        let recv_task = tokio::spawn(receive_loop(
            Arc::clone(&socket),
            peer,
            Arc::clone(&queue),
            Arc::clone(&shutdown),
            Arc::clone(&closed),
        ));

        Ok(Self {
            socket,
            peer,
            queue,
            shutdown,
            closed,
            recv_task: Mutex::new(Some(recv_task)),
        })
    }

    /// Address of the target device this link is bound to.
    #[must_use]
    pub const fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Local address the socket bound to.
    ///
    /// # Errors
    ///
    /// Propagates the socket's own lookup failure.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Datagrams evicted from a full receive queue so far.
    #[must_use]
    pub fn queue_overflows(&self) -> u64 {
        self.queue.overflow_count()
    }
}

impl ProbeLink for UdpLink {
    async fn send(&self, bytes: &[u8]) -> Result<()> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        self.socket.send_to(bytes, self.peer).await?;
        Ok(())
    }

    async fn receive(&self, deadline: Instant) -> Result<Option<InboundDatagram>> {
        let shutdown = self.shutdown.notified();
        tokio::pin!(shutdown);
        // Register before the closed check so a concurrent close cannot
        // slip between them unnoticed.
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
        let dropped = self.queue.flush();
        if dropped > 0 {
            trace!(dropped, "flushed stale datagrams before send");
        }
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shutdown.notify_waiters();
        self.queue.wake();
        if let Some(task) = self
            .recv_task
            .lock()
            .expect("recv task mutex poisoned")
            .take()
        {
            task.abort();
        }
        debug!(peer = %self.peer, "udp link closed");
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for UdpLink {
    fn drop(&mut self) {
        self.close();
    }
}

async fn receive_loop(
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
    queue: Arc<ReceiveQueue>,
    shutdown: Arc<Notify>,
    closed: Arc<AtomicBool>,
) {
    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];

    loop {
        let notified = shutdown.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        if closed.load(Ordering::SeqCst) {
            break;
        }

        let result = tokio::select! {
            () = &mut notified => break,
            result = socket.recv_from(&mut buf) => result,
        };

        match result {
            Ok((len, source)) => {
                if source != peer {
                    Metrics::record_noise();
                    trace!(%source, len, "dropped datagram from non-target source");
                    continue;
                }
                if len == 0 {
                    trace!(%source, "dropped empty datagram");
                    continue;
                }
                queue.push(InboundDatagram {
                    bytes: Bytes::copy_from_slice(&buf[..len]),
                    source,
                    received_at: Instant::now(),
                });
            }
            Err(err) => {
                if closed.load(Ordering::SeqCst) {
                    break;
                }
                // Transient (e.g. ICMP unreachable surfacing on some
                // platforms); the loop must outlive it.
                warn!(error = %err, "receive loop I/O error");
            }
        }
    }

    debug!(%peer, "receive loop terminated");
}
