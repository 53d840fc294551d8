//! Opcode sweep engine.
//!
//! Drives the opcode space through the session and codec and classifies
//! what comes back. Owns no transport or codec logic: a probe is "encode,
//! send-and-await, decode, classify", and any single opcode's failure is a
//! record, never an abort. Only resource-level transport errors (bind
//! failure, link closed) end a run early.

use std::ops::RangeInclusive;
use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::metrics::Metrics;
use crate::protocol::{self, FrameError, FrameLayout};
use crate::transport::{InboundDatagram, ProbeLink, ProbeSession, TransportError};

use super::record::{DecodeFailure, ScanRecord};
use super::target::ScanTarget;

/// Sweep pacing and probe-shape configuration.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Pause between consecutive probes, giving slow firmware room to
    /// settle.
    pub probe_delay: Duration,
    /// Payload attached to every probe frame.
    pub probe_payload: Bytes,
    /// Discard in-window replies whose opcode byte does not echo the probe.
    pub match_opcode: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            probe_delay: Duration::from_millis(20),
            probe_payload: Bytes::new(),
            match_opcode: true,
        }
    }
}

/// Errors that abort a whole sweep.
#[derive(Error, Debug)]
pub enum SweepError {
    /// Caller-supplied configuration is unusable
    #[error("invalid sweep configuration: {reason}")]
    InvalidConfig {
        /// What was wrong
        reason: &'static str,
    },

    /// Probe frame could not be encoded
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Fatal transport failure (per-probe timeouts are records, not errors)
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// The discovery sweep driver.
#[derive(Debug)]
pub struct SweepEngine<L> {
    session: ProbeSession<L>,
    layout: FrameLayout,
    config: SweepConfig,
}

impl<L: ProbeLink> SweepEngine<L> {
    /// Build an engine over an open session.
    #[must_use]
    pub fn new(session: ProbeSession<L>, layout: FrameLayout, config: SweepConfig) -> Self {
        Self {
            session,
            layout,
            config,
        }
    }

    /// The session this engine probes through.
    pub fn session(&self) -> &ProbeSession<L> {
        &self.session
    }

    /// The frame layout probes are built and parsed with.
    #[must_use]
    pub const fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    /// Close the underlying link.
    pub fn close(&self) {
        self.session.close();
    }

    /// Start a sweep over `target`'s opcode range.
    ///
    /// Returns a lazy sequence: records are produced one opcode at a time
    /// so a sink can start writing before the sweep (minutes, at one
    /// timeout budget per silent opcode) completes. Re-invoking with the
    /// same target is side-effect-free beyond what the device itself does.
    ///
    /// # Errors
    ///
    /// [`SweepError::InvalidConfig`] for an empty opcode range or a probe
    /// payload the layout cannot carry.
    pub fn sweep(&self, target: &ScanTarget) -> Result<Sweep<'_, L>, SweepError> {
        if target.opcodes.is_empty() {
            return Err(SweepError::InvalidConfig {
                reason: "opcode range is empty",
            });
        }
        if self.config.probe_payload.len() > self.layout.max_payload() {
            return Err(SweepError::InvalidConfig {
                reason: "probe payload exceeds layout capacity",
            });
        }

        info!(
            peer = %target.peer,
            opcodes = ?target.opcodes,
            "starting opcode sweep"
        );

        Ok(Sweep {
            engine: self,
            opcodes: target.opcodes.clone(),
            started: false,
            aborted: false,
        })
    }

    /// Run a sweep to completion and collect every record.
    ///
    /// # Errors
    ///
    /// Same fatal conditions as [`sweep`](Self::sweep) and
    /// [`Sweep::next_record`].
    pub async fn run(&self, target: &ScanTarget) -> Result<Vec<ScanRecord>, SweepError> {
        let mut sweep = self.sweep(target)?;
        let mut records = Vec::with_capacity(target.opcode_count());
        while let Some(result) = sweep.next_record().await {
            records.push(result?);
        }
        Ok(records)
    }

    async fn probe(&self, opcode: u8) -> Result<ScanRecord, SweepError> {
        let frame = protocol::encode(opcode, &self.config.probe_payload, &self.layout)?;
        let expect = self.config.match_opcode.then_some(opcode);

        let started = Instant::now();
        match self.session.send_and_await(&frame, expect).await {
            Ok(datagram) => Ok(self.classify(opcode, &datagram, started.elapsed())),
            Err(TransportError::Timeout { .. }) => {
                Ok(ScanRecord::timeout(opcode, started.elapsed()))
            }
            Err(fatal) => Err(fatal.into()),
        }
    }

    fn classify(&self, opcode: u8, datagram: &InboundDatagram, elapsed: Duration) -> ScanRecord {
        match protocol::decode(datagram.bytes.clone(), &self.layout) {
            Ok(frame) => {
                Metrics::record_frame_valid();
                info!(
                    opcode,
                    rx_opcode = frame.opcode(),
                    rx_length = frame.length(),
                    trailing = frame.trailing_len(),
                    "valid reply"
                );
                ScanRecord::valid(opcode, &frame, elapsed)
            }
            Err(FrameError::ChecksumMismatch {
                expected,
                found,
                frame,
            }) => {
                Metrics::record_frame_invalid();
                debug!(opcode, expected, found, "reply failed checksum");
                ScanRecord::checksum_mismatch(opcode, &frame, datagram.len(), elapsed)
            }
            Err(err) => {
                Metrics::record_frame_invalid();
                debug!(opcode, error = %err, "reply failed to parse");
                ScanRecord::structural_failure(
                    opcode,
                    datagram.bytes.clone(),
                    DecodeFailure::from_error(&err),
                    elapsed,
                )
            }
        }
    }
}

/// An in-progress sweep, yielding one record per opcode in ascending order.
#[derive(Debug)]
pub struct Sweep<'a, L> {
    engine: &'a SweepEngine<L>,
    opcodes: RangeInclusive<u8>,
    started: bool,
    aborted: bool,
}

impl<L: ProbeLink> Sweep<'_, L> {
    /// Probe the next opcode and classify the outcome.
    ///
    /// Yields `None` once the range is exhausted or after a fatal error has
    /// been returned.
    pub async fn next_record(&mut self) -> Option<Result<ScanRecord, SweepError>> {
        if self.aborted {
            return None;
        }
        let opcode = self.opcodes.next()?;

        if self.started && !self.engine.config.probe_delay.is_zero() {
            tokio::time::sleep(self.engine.config.probe_delay).await;
        }
        self.started = true;

        match self.engine.probe(opcode).await {
            Ok(record) => Some(Ok(record)),
            Err(err) => {
                self.aborted = true;
                Some(Err(err))
            }
        }
    }

    /// Opcodes not yet probed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.opcodes.clone().count()
    }
}

#[cfg(test)]
mod tests {
    use crate::protocol::{Checksum, encode};
    use crate::sweep::ScanStatus;
    use crate::transport::testutil::MockLink;
    use crate::transport::{ProbeLink, SessionConfig};

    use super::*;

    fn target(opcodes: RangeInclusive<u8>) -> ScanTarget {
        ScanTarget::new("127.0.0.1:8889".parse().unwrap()).with_opcodes(opcodes)
    }

    fn engine(link: MockLink) -> SweepEngine<MockLink> {
        let session = ProbeSession::new(
            link,
            SessionConfig {
                timeout: Duration::from_millis(100),
                max_retries: 1,
            },
        )
        .unwrap();
        SweepEngine::new(session, FrameLayout::default(), SweepConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn silent_peer_yields_ordered_timeouts() {
        let engine = engine(MockLink::silent());
        let records = engine.run(&target(0x00..=0x02)).await.unwrap();

        assert_eq!(records.len(), 3);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.opcode, i as u8);
            assert_eq!(record.status, ScanStatus::Timeout);
            assert_eq!(record.rx_length, 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn single_valid_responder_is_isolated() {
        // Device acknowledges 0x11 with a 6-byte payload, ignores the rest.
        let layout = FrameLayout::default();
        let link = MockLink::replying(move |frame| {
            if frame[2] == 0x11 {
                vec![encode(0x11, &[1, 2, 3, 4, 5, 6], &layout).unwrap()]
            } else {
                Vec::new()
            }
        });
        let engine = engine(link);

        let records = engine.run(&target(0x10..=0x12)).await.unwrap();
        assert_eq!(records.len(), 3);

        let hit = &records[1];
        assert_eq!(hit.opcode, 0x11);
        assert_eq!(hit.status, ScanStatus::Valid);
        assert_eq!(hit.rx_length, 7);
        assert_eq!(hit.trailing_bytes, 0);
        assert_eq!(hit.rx_opcode, Some(0x11));
        assert_eq!(hit.payload.as_deref(), Some(&[1u8, 2, 3, 4, 5, 6][..]));

        assert_eq!(records[0].status, ScanStatus::Timeout);
        assert_eq!(records[2].status, ScanStatus::Timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn checksum_mismatch_keeps_decoded_fields() {
        // Device folds from the header; our layout assumes from the opcode.
        let device_layout = FrameLayout {
            checksum_range: crate::protocol::ChecksumRange::FromHeader,
            ..FrameLayout::default()
        };
        let link = MockLink::replying(move |frame| {
            vec![encode(frame[2], &[0xAB], &device_layout).unwrap()]
        });
        let engine = engine(link);

        let records = engine.run(&target(0x07..=0x07)).await.unwrap();
        let record = &records[0];

        assert_eq!(record.status, ScanStatus::InvalidFmt);
        assert_eq!(record.failure, Some(crate::sweep::DecodeFailure::ChecksumMismatch));
        assert_eq!(record.rx_opcode, Some(0x07));
        assert_eq!(record.payload.as_deref(), Some(&[0xAB][..]));
        assert!(record.raw.is_some());
        assert_eq!(record.rx_length, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn garbage_reply_is_invalid_with_raw_bytes() {
        // Wrong sync byte, but the opcode echo passes the session filter.
        let link = MockLink::replying(|frame| vec![vec![0xAA, 0x01, frame[2], 0x00]]);
        let engine = engine(link);

        let records = engine.run(&target(0x20..=0x20)).await.unwrap();
        let record = &records[0];

        assert_eq!(record.status, ScanStatus::InvalidFmt);
        assert_eq!(record.failure, Some(crate::sweep::DecodeFailure::HeaderMismatch));
        assert_eq!(record.rx_length, 4);
        assert!(record.rx_opcode.is_none());
        assert_eq!(record.raw.as_deref(), Some(&[0xAA, 0x01, 0x20, 0x00][..]));
    }

    #[tokio::test(start_paused = true)]
    async fn sum8_layout_validates_matching_device() {
        let layout = FrameLayout {
            checksum: Checksum::Sum8,
            ..FrameLayout::default()
        };
        let link = MockLink::replying(move |frame| {
            vec![encode(frame[2], &[0x01], &layout).unwrap()]
        });
        let session = ProbeSession::new(
            link,
            SessionConfig {
                timeout: Duration::from_millis(100),
                max_retries: 0,
            },
        )
        .unwrap();
        let engine = SweepEngine::new(session, layout, SweepConfig::default());

        let records = engine.run(&target(0x33..=0x33)).await.unwrap();
        assert_eq!(records[0].status, ScanStatus::Valid);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_range_is_rejected() {
        let engine = engine(MockLink::silent());
        let result = engine.run(&target(0x10..=0x01)).await;
        assert!(matches!(result, Err(SweepError::InvalidConfig { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_probe_payload_is_rejected() {
        let session = ProbeSession::new(MockLink::silent(), SessionConfig::default()).unwrap();
        let config = SweepConfig {
            probe_payload: Bytes::from(vec![0u8; 255]),
            ..SweepConfig::default()
        };
        let engine = SweepEngine::new(session, FrameLayout::default(), config);

        let result = engine.run(&target(0x00..=0x01)).await;
        assert!(matches!(result, Err(SweepError::InvalidConfig { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn records_stream_lazily_and_end_with_none() {
        let engine = engine(MockLink::silent());
        let scan_target = target(0x00..=0x01);
        let mut sweep = engine.sweep(&scan_target).unwrap();

        assert_eq!(sweep.remaining(), 2);
        let first = sweep.next_record().await.unwrap().unwrap();
        assert_eq!(first.opcode, 0x00);
        assert_eq!(sweep.remaining(), 1);

        let second = sweep.next_record().await.unwrap().unwrap();
        assert_eq!(second.opcode, 0x01);
        assert!(sweep.next_record().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_is_restartable() {
        let layout = FrameLayout::default();
        let link = MockLink::replying(move |frame| {
            vec![encode(frame[2], &[], &layout).unwrap()]
        });
        let engine = engine(link);
        let scan_target = target(0x01..=0x03);

        let first = engine.run(&scan_target).await.unwrap();
        let second = engine.run(&scan_target).await.unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(
            first.iter().map(|r| (r.opcode, r.status)).collect::<Vec<_>>(),
            second.iter().map(|r| (r.opcode, r.status)).collect::<Vec<_>>()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn closed_link_aborts_the_run() {
        let link = MockLink::silent();
        link.close();
        let engine = engine(link);

        let scan_target = target(0x00..=0x02);
        let mut sweep = engine.sweep(&scan_target).unwrap();

        let result = sweep.next_record().await.unwrap();
        assert!(matches!(
            result,
            Err(SweepError::Transport(TransportError::Closed))
        ));
        // Fatal: the sequence ends instead of continuing the range.
        assert!(sweep.next_record().await.is_none());
    }
}
