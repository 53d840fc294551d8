//! Transport-level error types.

use std::net::SocketAddr;

use thiserror::Error;

/// Errors produced by links and probe sessions.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Could not bind the local socket. Fatal to the run.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested local address
        addr: SocketAddr,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// Underlying socket failure after binding. Fatal to the run.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No reply after every retry. Expected during a sweep, never fatal.
    #[error("no reply after {attempts} attempt(s)")]
    Timeout {
        /// Attempts made, including the initial transmit
        attempts: u32,
    },

    /// The link was closed while the operation was in flight.
    #[error("link closed")]
    Closed,

    /// Caller-supplied configuration is unusable.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong
        reason: &'static str,
    },
}

impl TransportError {
    /// Whether this error should abort a whole sweep rather than a single
    /// probe.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Timeout { .. })
    }
}

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;
