//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sui file e la discovery delle immagini.
//!
//! ## Responsabilità:
//! - Discovery dei file immagine nella cartella di input (non ricorsiva)
//! - Determinazione formato file tramite estensione
//! - Pre-filtro: esclude i file già entro la dimensione obiettivo
//! - Calcolo del path di output (`<output_dir>/resized_<nome>`)
//!
//! ## Formati supportati:
//! - **Immagini**: PNG, JPG, JPEG, GIF (estensione case-insensitive)
//!
//! ## Esempio:
//! ```ignore
//! let files = FileManager::find_image_files(Path::new("/path/to/images"))?;
//! let selection = FileManager::select_candidates(files, target_bytes)?;
//! ```

use anyhow::Result;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Prefix added to every resized output file name
pub const OUTPUT_PREFIX: &str = "resized_";

/// Result of the size pre-filter
#[derive(Debug, Default)]
pub struct CandidateSelection {
    /// Files larger than the target, with their on-disk size
    pub candidates: Vec<(PathBuf, u64)>,
    /// Files already at or below the target, with their on-disk size
    pub already_small: Vec<(PathBuf, u64)>,
}

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Find all supported image files directly inside `input_dir`, sorted by path
    pub fn find_image_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
        if !input_dir.is_dir() {
            return Err(anyhow::anyhow!(
                "Input folder does not exist or is not a directory: {}",
                input_dir.display()
            ));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(input_dir).min_depth(1).max_depth(1) {
            let entry = entry?;
            if entry.file_type().is_file() && Self::is_supported_format(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }

    /// Check if a file format is supported
    pub fn is_supported_format(path: &Path) -> bool {
        matches!(
            ImageFormat::from_path(path),
            Ok(ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif)
        )
    }

    /// Split files into resize candidates and files that are already small enough.
    ///
    /// A file is a candidate only when its size strictly exceeds `target_bytes`.
    pub fn select_candidates(files: Vec<PathBuf>, target_bytes: u64) -> Result<CandidateSelection> {
        let mut selection = CandidateSelection::default();

        for path in files {
            let size = Self::get_file_size(&path)?;
            if size > target_bytes {
                selection.candidates.push((path, size));
            } else {
                selection.already_small.push((path, size));
            }
        }

        Ok(selection)
    }

    /// Get the size of a file in bytes
    pub fn get_file_size(path: &Path) -> Result<u64> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| anyhow::anyhow!("Failed to read metadata of {}: {}", path.display(), e))?;
        Ok(metadata.len())
    }

    /// Output path for a resized file: `<output_dir>/resized_<basename>`
    pub fn output_path(input_path: &Path, output_dir: &Path) -> PathBuf {
        let file_name = input_path.file_name().unwrap_or_default().to_string_lossy();
        output_dir.join(format!("{}{}", OUTPUT_PREFIX, file_name))
    }

    /// Ratio of resulting size to original size (0.0 when original is empty)
    pub fn calculate_ratio(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            new_size as f64 / original_size as f64
        }
    }
}
