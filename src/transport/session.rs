//! Retry and timeout policy over a probe link.
//!
//! A session turns "send bytes, maybe hear back" into the harness contract:
//! one outstanding request at a time, a fresh wall-clock deadline per
//! attempt, identical retransmits with no backoff (probed devices are
//! stateless per request), and a definitive timeout only once every retry
//! is spent.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::metrics::Metrics;
use crate::protocol::OPCODE_OFFSET;

use super::error::{Result, TransportError};
use super::link::{InboundDatagram, ProbeLink};

/// Session retry/timeout configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long to wait for a reply per attempt.
    pub timeout: Duration,
    /// Retransmissions after the initial send.
    pub max_retries: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
            max_retries: 2,
        }
    }
}

/// Serialized request/response driver over any [`ProbeLink`].
#[derive(Debug)]
pub struct ProbeSession<L> {
    link: L,
    config: SessionConfig,
    // One outstanding request at a time: with no sequence numbers on the
    // wire, ordering is the only request/reply correlation there is.
    guard: Mutex<()>,
}

impl<L: ProbeLink> ProbeSession<L> {
    /// Wrap a link with retry policy.
    ///
    /// # Errors
    ///
    /// [`TransportError::InvalidConfig`] for a zero timeout.
    pub fn new(link: L, config: SessionConfig) -> Result<Self> {
        if config.timeout.is_zero() {
            return Err(TransportError::InvalidConfig {
                reason: "per-attempt timeout must be positive",
            });
        }
        Ok(Self {
            link,
            config,
            guard: Mutex::new(()),
        })
    }

    /// Access the underlying link.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Close the underlying link.
    pub fn close(&self) {
        self.link.close();
    }

    /// Transmit `frame` and wait for a reply from the peer.
    ///
    /// Stale datagrams already queued are flushed before each transmit.
    /// When `expect_opcode` is set, replies long enough to carry an opcode
    /// byte that does not match are discarded inside the wait window;
    /// replies too short to check are handed back as-is, since a runt reply
    /// is evidence too.
    ///
    /// # Errors
    ///
    /// [`TransportError::Timeout`] after all retries are exhausted,
    /// [`TransportError::Closed`] if the link is closed mid-wait, or the
    /// link's own send/receive failure.
    pub async fn send_and_await(
        &self,
        frame: &[u8],
        expect_opcode: Option<u8>,
    ) -> Result<InboundDatagram> {
        let _serialized = self.guard.lock().await;
        let attempts = self.config.max_retries + 1;

        for attempt in 0..attempts {
            self.link.flush_pending();

            if attempt > 0 {
                Metrics::record_retransmit();
                debug!(attempt, attempts, "retransmitting request");
            }
            self.link.send(frame).await?;
            Metrics::record_probe();

            let deadline = Instant::now() + self.config.timeout;
            loop {
                match self.link.receive(deadline).await? {
                    None => break,
                    Some(datagram) => {
                        if let Some(expected) = expect_opcode {
                            if datagram.len() > OPCODE_OFFSET
                                && datagram.bytes[OPCODE_OFFSET] != expected
                            {
                                Metrics::record_stale_reply();
                                trace!(
                                    got = datagram.bytes[OPCODE_OFFSET],
                                    expected,
                                    "dropped reply with mismatched opcode"
                                );
                                continue;
                            }
                        }
                        Metrics::record_reply();
                        return Ok(datagram);
                    }
                }
            }
        }

        Metrics::record_timeout();
        debug!(attempts, "request exhausted all attempts");
        Err(TransportError::Timeout { attempts })
    }
}
