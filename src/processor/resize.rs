//! # Resize Stage
//!
//! Invoca il tool esterno per produrre il file scalato e calcola un singolo
//! passo correttivo consultivo.
//!
//! ## Politica:
//! - Fattore di scala geometrico: `floor(dim × sqrt(target / size))`
//! - Guard: se una dimensione calcolata è 0, nessuna chiamata al tool,
//!   outcome con `iterations = 0` e `compression_ratio = 0.0`
//! - Dopo il resize: `d' = d × (1 − k × |actual − target| / actual)`.
//!   È solo un suggerimento: non viene eseguito un secondo passaggio,
//!   `iterations` vale sempre 1
//!
//! ## Output:
//! Il tool scrive su un file temporaneo in `output_dir` che viene poi rinominato
//! in `resized_<nome>`, così un errore a metà non lascia output parziali.

use crate::codec::ImageTool;
use crate::config::Config;
use crate::error::ResizeError;
use crate::file_manager::{FileManager, OUTPUT_PREFIX};
use crate::processor::probe::ProbeResult;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Report of one resize attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResizeOutcome {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub original_size: u64,
    pub resulting_size: u64,
    /// `resulting_size / original_size`, 0.0 when nothing was written
    pub compression_ratio: f64,
    /// 1 after a transform, 0 when the transform was skipped
    pub iterations: u32,
    pub requested_width: u32,
    pub requested_height: u32,
    /// Advisory next-pass dimensions, never applied
    pub suggested_dimensions: Option<(u32, u32)>,
}

impl ResizeOutcome {
    /// True when the external transform was not invoked
    pub fn is_skipped(&self) -> bool {
        self.iterations == 0
    }
}

/// Single damped correction of `(width, height)` given the observed size.
///
/// `d' = floor(d × (1 − k × |actual − target| / actual))`, clamped at 0.
pub fn corrective_dimensions(
    width: u32,
    height: u32,
    actual_size: u64,
    target_size: u64,
    damping_factor: f64,
) -> (u32, u32) {
    if actual_size == 0 {
        return (width, height);
    }

    let overshoot = (actual_size as f64 - target_size as f64).abs() / actual_size as f64;
    let factor = 1.0 - damping_factor * overshoot;
    let adjust = |d: u32| (d as f64 * factor).floor().max(0.0) as u32;

    (adjust(width), adjust(height))
}

/// Resize one probed image into `config.output_dir`
pub fn resize_image(
    tool: &dyn ImageTool,
    probe: &ProbeResult,
    config: &Config,
) -> Result<ResizeOutcome, ResizeError> {
    let input_path = &probe.record.path;
    let output_path = FileManager::output_path(input_path, &config.output_dir);
    let (width, height) = (probe.target_width, probe.target_height);

    if width == 0 || height == 0 {
        debug!(
            "Skipping transform for {}: invalid dimensions {}x{}",
            input_path.display(),
            width,
            height
        );
        return Ok(ResizeOutcome {
            input_path: input_path.clone(),
            output_path,
            original_size: probe.record.size,
            resulting_size: 0,
            compression_ratio: 0.0,
            iterations: 0,
            requested_width: width,
            requested_height: height,
            suggested_dimensions: None,
        });
    }

    std::fs::create_dir_all(&config.output_dir)?;
    write_scaled(tool, input_path, &output_path, &config.output_dir, width, height)?;

    let resulting_size = std::fs::metadata(&output_path)?.len();
    let suggested = corrective_dimensions(
        width,
        height,
        resulting_size,
        config.target_bytes,
        config.damping_factor,
    );

    Ok(ResizeOutcome {
        input_path: input_path.clone(),
        output_path,
        original_size: probe.record.size,
        resulting_size,
        compression_ratio: FileManager::calculate_ratio(probe.record.size, resulting_size),
        iterations: 1,
        requested_width: width,
        requested_height: height,
        suggested_dimensions: Some(suggested),
    })
}

/// Scale into a temp file next to `output_path`, then move it into place
fn write_scaled(
    tool: &dyn ImageTool,
    input_path: &Path,
    output_path: &Path,
    output_dir: &Path,
    width: u32,
    height: u32,
) -> Result<(), ResizeError> {
    // ffmpeg picks the muxer from the extension
    let suffix = input_path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let temp_file = tempfile::Builder::new()
        .prefix(&format!(".{}", OUTPUT_PREFIX))
        .suffix(&suffix)
        .tempfile_in(output_dir)?;

    tool.scale(input_path, temp_file.path(), width, height)?;

    temp_file
        .persist(output_path)
        .map_err(|e| ResizeError::Io(e.error))?;

    // temp files are created 0600; outputs get the usual file mode
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(output_path, std::fs::Permissions::from_mode(OUTPUT_MODE))?;
    }

    Ok(())
}

#[cfg(unix)]
const OUTPUT_MODE: u32 = 0o644;
