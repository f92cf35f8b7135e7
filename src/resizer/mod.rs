//! # Resizer Module
//!
//! Orchestrazione del run batch, separata in sottomoduli:
//! - `batch_resizer`: Orchestratore principale (probe → resize su worker pool)
//! - `progress_tracker`: Progress bar e output JSON per fase

pub mod batch_resizer;
pub mod progress_tracker;

pub use batch_resizer::{BatchReport, BatchResizer};
pub use progress_tracker::ProgressTracker;
