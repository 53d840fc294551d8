//! Harness-wide counters tracked without external dependencies.

use std::sync::atomic::{AtomicU64, Ordering};

static PROBES_SENT: AtomicU64 = AtomicU64::new(0);
static RETRANSMITS: AtomicU64 = AtomicU64::new(0);
static TIMEOUTS: AtomicU64 = AtomicU64::new(0);
static REPLIES: AtomicU64 = AtomicU64::new(0);
static STALE_REPLIES_DROPPED: AtomicU64 = AtomicU64::new(0);
static NOISE_DROPPED: AtomicU64 = AtomicU64::new(0);
static QUEUE_OVERFLOWS: AtomicU64 = AtomicU64::new(0);
static FRAMES_VALID: AtomicU64 = AtomicU64::new(0);
static FRAMES_INVALID: AtomicU64 = AtomicU64::new(0);

/// Recorder facade used by the transport and sweep layers.
pub(crate) struct Metrics;

impl Metrics {
    #[inline]
    pub(crate) fn record_probe() {
        PROBES_SENT.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_retransmit() {
        RETRANSMITS.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_timeout() {
        TIMEOUTS.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_reply() {
        REPLIES.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_stale_reply() {
        STALE_REPLIES_DROPPED.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_noise() {
        NOISE_DROPPED.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_queue_overflow() {
        QUEUE_OVERFLOWS.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_frame_valid() {
        FRAMES_VALID.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_frame_invalid() {
        FRAMES_INVALID.fetch_add(1, Ordering::Relaxed);
    }
}

/// Lightweight snapshot of harness counters.
///
/// Counters are process-wide and monotonic; take a snapshot before and
/// after a run to attribute activity to it.
#[derive(Default, Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    /// Request frames transmitted, counting retransmits.
    pub probes_sent: u64,
    /// Retransmissions of an already-sent request.
    pub retransmits: u64,
    /// Probes that exhausted every retry without a reply.
    pub timeouts: u64,
    /// Replies accepted and handed to the caller.
    pub replies: u64,
    /// In-window replies dropped for carrying the wrong opcode.
    pub stale_replies_dropped: u64,
    /// Datagrams dropped for arriving from a non-target source.
    pub noise_dropped: u64,
    /// Datagrams evicted from a full receive queue (oldest-first).
    pub queue_overflows: u64,
    /// Replies that decoded with a valid checksum.
    pub frames_valid: u64,
    /// Replies that failed structural or checksum validation.
    pub frames_invalid: u64,
}

/// Read the current counter values.
#[must_use]
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        probes_sent: PROBES_SENT.load(Ordering::Relaxed),
        retransmits: RETRANSMITS.load(Ordering::Relaxed),
        timeouts: TIMEOUTS.load(Ordering::Relaxed),
        replies: REPLIES.load(Ordering::Relaxed),
        stale_replies_dropped: STALE_REPLIES_DROPPED.load(Ordering::Relaxed),
        noise_dropped: NOISE_DROPPED.load(Ordering::Relaxed),
        queue_overflows: QUEUE_OVERFLOWS.load(Ordering::Relaxed),
        frames_valid: FRAMES_VALID.load(Ordering::Relaxed),
        frames_invalid: FRAMES_INVALID.load(Ordering::Relaxed),
    }
}
