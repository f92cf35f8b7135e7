//! # Probe Stage
//!
//! Interroga il tool esterno per dimensioni e peso di un file e calcola il
//! fattore di scala stimato verso la dimensione obiettivo.

use crate::codec::ImageTool;
use crate::config::Config;
use crate::error::ResizeError;
use crate::size::estimate_scale_factor;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read-only snapshot of one probe call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRecord {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub size: u64,
}

/// A probed image together with the geometry it should be scaled to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    pub record: ImageRecord,
    /// `sqrt(target / size)`
    pub scale_factor: f64,
    pub target_width: u32,
    pub target_height: u32,
}

impl ProbeResult {
    /// Build a result from a record and the configured target size
    pub fn from_record(record: ImageRecord, target_bytes: u64) -> Result<Self, ResizeError> {
        let scale_factor = estimate_scale_factor(record.size, target_bytes)?;
        let (target_width, target_height) =
            scaled_dimensions(record.width, record.height, scale_factor);

        Ok(Self {
            record,
            scale_factor,
            target_width,
            target_height,
        })
    }
}

/// `floor(width × scale)`, `floor(height × scale)`
pub fn scaled_dimensions(width: u32, height: u32, scale_factor: f64) -> (u32, u32) {
    let scale = |d: u32| (d as f64 * scale_factor).floor().max(0.0) as u32;
    (scale(width), scale(height))
}

/// Probe `path` and compute its scale factor toward `config.target_bytes`
pub fn probe_image(
    tool: &dyn ImageTool,
    path: &Path,
    config: &Config,
) -> Result<ProbeResult, ResizeError> {
    let data = tool.probe(path)?;
    let record = ImageRecord {
        path: path.to_path_buf(),
        width: data.width,
        height: data.height,
        size: data.size,
    };

    let result = ProbeResult::from_record(record, config.target_bytes)?;
    debug!(
        "Probed {}: {}x{} {} bytes, scale {:.4} -> {}x{}",
        path.display(),
        result.record.width,
        result.record.height,
        result.record.size,
        result.scale_factor,
        result.target_width,
        result.target_height
    );

    Ok(result)
}
