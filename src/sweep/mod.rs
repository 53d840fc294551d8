//! Sweep engine: drive the opcode space, classify the evidence.

mod engine;
mod record;
mod target;

pub use engine::{Sweep, SweepConfig, SweepEngine, SweepError};
pub use record::{DecodeFailure, ScanRecord, ScanStatus};
pub use target::ScanTarget;
