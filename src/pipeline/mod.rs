//! Orchestration of one or more computers.
//!
//! - [`sweep`]: many independent computers seeded with different inputs
//! - [`amplifier`]: computers chained in a series or a feedback ring
//! - [`session`]: one computer driven interactively from the caller's thread

pub mod sweep;
pub mod amplifier;
pub mod session;

pub use sweep::{sweep, find_noun_verb, run_noun_verb, SweepHit};
pub use amplifier::{feedback_loop, highest_signal, permutations, series, Wiring};
pub use session::{Exchange, Session};

use crate::cpu::ExecutionError;
use thiserror::Error;

/// Errors reported by orchestrators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("computer {index} failed: {source}")]
    Execution { index: usize, source: ExecutionError },

    #[error("computer {index} panicked")]
    Panicked { index: usize },

    #[error("no phase settings given")]
    Empty,

    #[error("pipeline produced no signal")]
    NoSignal,

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl PipelineError {
    /// Whether this is a cancellation rather than a genuine failure.
    pub fn is_aborted(&self) -> bool {
        matches!(self, PipelineError::Execution { source: ExecutionError::Aborted, .. })
    }
}
