//! # Progress Tracking Module
//!
//! Unifica progress bar e output JSON in un singolo tracker per fase.
//! Ogni file completato viene riportato appena termina, quindi l'ordine
//! dei messaggi dipende dall'ordine di completamento.

use crate::{
    json_output::JsonMessage,
    progress::ProgressManager,
    state::{FileState, SkipReason},
};
use std::path::Path;
use tracing::{error, info};

/// Tracker per una fase (probe o resize)
#[derive(Clone)]
pub struct ProgressTracker {
    json_output: bool,
    progress_manager: ProgressManager,
}

impl ProgressTracker {
    /// Crea un nuovo tracker
    pub fn new(total_files: usize, phase: &str, json_output: bool) -> Self {
        let progress_manager = if json_output {
            ProgressManager::hidden()
        } else {
            ProgressManager::new(total_files as u64, phase)
        };

        Self {
            json_output,
            progress_manager,
        }
    }

    /// Riporta lo stato di un file appena completato
    pub fn record(&self, path: &Path, state: &FileState) {
        let name = path.file_name().unwrap_or_default().to_string_lossy();

        let message = match state {
            FileState::Probed(result) => {
                info!(
                    "🔍 {}: {}x{} {} bytes, scale {:.4} -> {}x{}",
                    name,
                    result.record.width,
                    result.record.height,
                    result.record.size,
                    result.scale_factor,
                    result.target_width,
                    result.target_height
                );
                format!("🔍 {}", name)
            }
            FileState::Resized(outcome) => {
                let (sw, sh) = outcome.suggested_dimensions.unwrap_or_default();
                info!(
                    "✅ {}: {} -> {} bytes (ratio {:.3}), next pass would use {}x{}",
                    name,
                    outcome.original_size,
                    outcome.resulting_size,
                    outcome.compression_ratio,
                    sw,
                    sh
                );
                format!("✅ {}", name)
            }
            FileState::Skipped(reason) => {
                info!("⏩ {}: skipped, {}", name, reason);
                format!("⏩ {}", name)
            }
            FileState::Failed(cause) => {
                error!("❌ {}: {}", name, cause);
                format!("❌ {}", name)
            }
        };

        if self.json_output {
            Self::to_json(path, state).emit();
        }

        self.progress_manager.update(&message);
    }

    /// Finalizza progress bar
    pub fn finish(&self, summary: &str) {
        self.progress_manager.finish(summary);
    }

    fn to_json(path: &Path, state: &FileState) -> JsonMessage {
        match state {
            FileState::Probed(result) => JsonMessage::FileProbed {
                result: result.clone(),
            },
            FileState::Resized(outcome) => JsonMessage::FileResized {
                outcome: outcome.clone(),
            },
            FileState::Skipped(reason) => JsonMessage::FileSkipped {
                path: path.to_path_buf(),
                reason: match reason {
                    SkipReason::AlreadySmall { .. } => "already_small".to_string(),
                    SkipReason::InvalidDimensions(_) => "invalid_dimensions".to_string(),
                },
            },
            FileState::Failed(cause) => JsonMessage::FileError {
                path: path.to_path_buf(),
                error: cause.clone(),
            },
        }
    }
}
