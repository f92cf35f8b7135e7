//! # Per-File State Module
//!
//! Stato finale di ogni file in un run. Nessuna persistenza: tutto vive in
//! memoria per la durata dell'invocazione.
//!
//! ## Macchina a stati:
//! ```text
//! Pending → Probed → Resized
//!                  → Skipped(InvalidDimensions)
//! Pending → Skipped(AlreadySmall)
//! Pending | Probed → Failed
//! ```
//! `Probed` è uno stato finale solo in modalità probe-only.

use crate::processor::{ProbeResult, ResizeOutcome};
use std::fmt;

/// Why a file was not resized
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Current size does not exceed the target
    AlreadySmall { size: u64, target: u64 },
    /// A computed dimension was zero; the transform was not invoked
    InvalidDimensions(ResizeOutcome),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadySmall { size, target } => {
                write!(f, "already small ({} <= {} bytes)", size, target)
            }
            SkipReason::InvalidDimensions(outcome) => write!(
                f,
                "invalid dimensions {}x{}",
                outcome.requested_width, outcome.requested_height
            ),
        }
    }
}

/// Final state of one input file
#[derive(Debug, Clone, PartialEq)]
pub enum FileState {
    Probed(ProbeResult),
    Resized(ResizeOutcome),
    Skipped(SkipReason),
    Failed(String),
}

impl FileState {
    /// Wrap a resize outcome, mapping a guarded (zero-iteration) one to a skip
    pub fn from_outcome(outcome: ResizeOutcome) -> Self {
        if outcome.is_skipped() {
            FileState::Skipped(SkipReason::InvalidDimensions(outcome))
        } else {
            FileState::Resized(outcome)
        }
    }
}
