//! Bounded receive queue with explicit drop-oldest overflow policy.
//!
//! The receive loop must never block: losing a buffered datagram is
//! recoverable, losing the next one off the wire is not. At capacity the
//! oldest unconsumed entry is evicted and counted.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::warn;

use crate::metrics::Metrics;

use super::link::InboundDatagram;

/// Default queue capacity; sized to absorb bursts from chatty devices.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Single-producer/single-consumer bounded datagram queue.
#[derive(Debug)]
pub struct ReceiveQueue {
    inner: Mutex<VecDeque<InboundDatagram>>,
    notify: Notify,
    capacity: usize,
    overflows: AtomicU64,
}

impl ReceiveQueue {
    /// Create a queue holding at most `capacity` datagrams.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be positive");
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
            notify: Notify::new(),
            capacity,
            overflows: AtomicU64::new(0),
        }
    }

    /// Deposit a datagram, evicting the oldest entry when full.
    ///
    /// Never blocks and never fails; overflow is a degraded-mode signal,
    /// not an error.
    pub fn push(&self, datagram: InboundDatagram) {
        {
            let mut queue = self.inner.lock().expect("receive queue mutex poisoned");
            if queue.len() >= self.capacity {
                queue.pop_front();
                self.overflows.fetch_add(1, Ordering::Relaxed);
                Metrics::record_queue_overflow();
                warn!(capacity = self.capacity, "receive queue full, dropped oldest datagram");
            }
            queue.push_back(datagram);
        }
        self.notify.notify_one();
    }

    /// Take the oldest queued datagram without waiting.
    pub fn try_recv(&self) -> Option<InboundDatagram> {
        self.inner
            .lock()
            .expect("receive queue mutex poisoned")
            .pop_front()
    }

    /// Wait for a datagram until `deadline`.
    ///
    /// Suspends between arrivals; returns `None` once the deadline passes
    /// with the queue still empty.
    pub async fn recv_before(&self, deadline: Instant) -> Option<InboundDatagram> {
        loop {
            // Arm the waiter before checking, so a push between the check
            // and the await cannot be missed.
            let notified = self.notify.notified();
            if let Some(datagram) = self.try_recv() {
                return Some(datagram);
            }

            tokio::select! {
                () = notified => {}
                () = tokio::time::sleep_until(deadline) => return self.try_recv(),
            }
        }
    }

    /// Discard everything queued; returns how many were dropped.
    pub fn flush(&self) -> usize {
        let mut queue = self.inner.lock().expect("receive queue mutex poisoned");
        let dropped = queue.len();
        queue.clear();
        dropped
    }

    /// Wake any blocked receiver without queueing data.
    ///
    /// Used on close so a pending wait can observe shutdown promptly.
    pub fn wake(&self) {
        self.notify.notify_waiters();
    }

    /// Number of datagrams currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("receive queue mutex poisoned")
            .len()
    }

    /// Whether the queue holds no datagrams.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Datagrams evicted because the queue was full.
    #[must_use]
    pub fn overflow_count(&self) -> u64 {
        self.overflows.load(Ordering::Relaxed)
    }
}
