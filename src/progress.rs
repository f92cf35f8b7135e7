//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche del resize.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` per feedback real-time (una per fase)
//! - Tracking statistiche del run (file trovati, ridimensionati, saltati, errori)
//! - Report finale con byte prima/dopo e rapporto medio
//!
//! ## Visual feedback:
//! ```text
//! ⠋ resize [00:00:04] [========================================] 12/12 (100%) ✅ photo.jpg
//! ```

use crate::size::format_size;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages progress reporting for one pipeline phase
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager labelled with the phase name
    pub fn new(total_files: u64, phase: &str) -> Self {
        let bar = ProgressBar::new(total_files);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {prefix} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        bar.set_prefix(phase.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// A manager that draws nothing (JSON mode)
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Statistics for one resize run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResizeStats {
    pub files_found: usize,
    pub files_probed: usize,
    pub files_resized: usize,
    pub files_skipped: usize,
    pub errors: usize,
    pub total_original_size: u64,
    pub total_resulting_size: u64,
}

impl ResizeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_probed(&mut self) {
        self.files_probed += 1;
    }

    pub fn add_resized(&mut self, original_size: u64, new_size: u64) {
        self.files_resized += 1;
        self.total_original_size += original_size;
        self.total_resulting_size += new_size;
    }

    pub fn add_skipped(&mut self) {
        self.files_skipped += 1;
    }

    pub fn add_error(&mut self) {
        self.errors += 1;
    }

    /// Resulting bytes over original bytes for resized files
    pub fn overall_ratio(&self) -> f64 {
        if self.total_original_size > 0 {
            self.total_resulting_size as f64 / self.total_original_size as f64
        } else {
            0.0
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Found: {} | Probed: {} | Resized: {} | Skipped: {} | Errors: {} | {} -> {} ({:.2}x)",
            self.files_found,
            self.files_probed,
            self.files_resized,
            self.files_skipped,
            self.errors,
            format_size(self.total_original_size),
            format_size(self.total_resulting_size),
            self.overall_ratio()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_accumulate() {
        let mut stats = ResizeStats::new();
        stats.add_probed();
        stats.add_probed();
        stats.add_resized(4000, 1000);
        stats.add_skipped();
        stats.add_error();

        assert_eq!(stats.files_probed, 2);
        assert_eq!(stats.files_resized, 1);
        assert_eq!(stats.files_skipped, 1);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.overall_ratio(), 0.25);
        assert!(stats.format_summary().contains("Resized: 1"));
    }

    #[test]
    fn test_ratio_without_resizes() {
        assert_eq!(ResizeStats::new().overall_ratio(), 0.0);
    }
}
