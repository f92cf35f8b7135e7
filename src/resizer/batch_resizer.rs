//! # Batch Resizer Orchestrator
//!
//! Orchestratore principale: discovery → pre-filtro → probe → resize.
//!
//! ## Concorrenza:
//! - Pool di worker limitato da un semaforo (default: parallelismo disponibile)
//! - Ogni chiamata al tool esterno gira su un thread bloccante (`spawn_blocking`)
//! - Le fasi sono strettamente sequenziali: il resize parte solo dopo tutti i probe
//! - Un errore su un file diventa `FileState::Failed` e non cancella gli altri task
//! - Nessun timeout e nessuna cancellazione: ogni task arriva in fondo
//!
//! ## Esempio:
//! ```ignore
//! let resizer = BatchResizer::new(config, Arc::new(FfmpegTool::new(toolchain)))?;
//! let report = resizer.run().await?;
//! ```

use crate::{
    codec::ImageTool,
    config::Config,
    error::ResizeError,
    file_manager::FileManager,
    json_output::JsonMessage,
    processor::{probe_image, resize_image, ProbeResult},
    progress::ResizeStats,
    resizer::progress_tracker::ProgressTracker,
    size::format_size,
    state::{FileState, SkipReason},
};
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info};

/// Final per-file states of a run, keyed by input path
#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: BTreeMap<PathBuf, FileState>,
    pub stats: ResizeStats,
    pub duration_seconds: f64,
}

impl BatchReport {
    pub fn get(&self, path: &Path) -> Option<&FileState> {
        self.files.get(path)
    }

    /// Files whose processing failed, with the cause
    pub fn failures(&self) -> impl Iterator<Item = (&PathBuf, &String)> {
        self.files.iter().filter_map(|(path, state)| match state {
            FileState::Failed(cause) => Some((path, cause)),
            _ => None,
        })
    }
}

/// Orchestratore del resize batch
pub struct BatchResizer {
    config: Arc<Config>,
    tool: Arc<dyn ImageTool>,
}

impl BatchResizer {
    /// Crea un nuovo orchestratore, validando la configurazione
    pub fn new(config: Config, tool: Arc<dyn ImageTool>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            tool,
        })
    }

    /// Esegue il run completo e ritorna lo stato finale di ogni file
    pub async fn run(&self) -> Result<BatchReport> {
        let start = Instant::now();
        let config = self.config.as_ref();

        info!("Starting resize in: {}", config.input_root.display());
        info!(
            "🎯 Target size: {} ({} bytes)",
            format_size(config.target_bytes),
            config.target_bytes
        );
        info!("🔧 Workers: {}", config.workers);
        if config.probe_only {
            info!("🧪 Probe-only mode: no files will be written");
        } else {
            info!("📁 Output directory: {}", config.output_dir.display());
        }

        let files = FileManager::find_image_files(&config.input_root)?;
        info!("Found {} image files", files.len());
        if config.json_output {
            JsonMessage::start(config, files.len()).emit();
        }

        let mut report = BatchReport::default();
        report.stats.files_found = files.len();

        let selection = FileManager::select_candidates(files, config.target_bytes)?;
        let probe_tracker = ProgressTracker::new(
            selection.candidates.len() + selection.already_small.len(),
            "probe",
            config.json_output,
        );

        for (path, size) in selection.already_small {
            let state = FileState::Skipped(SkipReason::AlreadySmall {
                size,
                target: config.target_bytes,
            });
            probe_tracker.record(&path, &state);
            report.files.insert(path, state);
        }

        // Phase 1: probe every candidate
        let probe_items: Vec<(PathBuf, PathBuf)> = selection
            .candidates
            .into_iter()
            .map(|(path, _)| (path.clone(), path))
            .collect();
        let probed = self
            .run_pooled(probe_items, &probe_tracker, |tool, config, path: PathBuf| {
                probe_image(tool, &path, config).map(FileState::Probed)
            })
            .await?;
        probe_tracker.finish("probe complete");

        let mut to_resize: Vec<(PathBuf, ProbeResult)> = Vec::new();
        for (path, state) in probed {
            match state {
                FileState::Probed(result) => {
                    report.stats.add_probed();
                    if config.probe_only {
                        report.files.insert(path, FileState::Probed(result));
                    } else {
                        to_resize.push((path, result));
                    }
                }
                other => {
                    report.files.insert(path, other);
                }
            }
        }

        // Phase 2: resize, only after every probe has completed
        if !config.probe_only && !to_resize.is_empty() {
            debug!("Resizing {} probed files", to_resize.len());
            let resize_tracker =
                ProgressTracker::new(to_resize.len(), "resize", config.json_output);
            let resized = self
                .run_pooled(to_resize, &resize_tracker, |tool, config, probe: ProbeResult| {
                    resize_image(tool, &probe, config).map(FileState::from_outcome)
                })
                .await?;
            resize_tracker.finish("resize complete");
            report.files.extend(resized);
        }

        for state in report.files.values() {
            match state {
                FileState::Resized(outcome) => {
                    report
                        .stats
                        .add_resized(outcome.original_size, outcome.resulting_size);
                }
                FileState::Skipped(_) => report.stats.add_skipped(),
                FileState::Failed(_) => report.stats.add_error(),
                FileState::Probed(_) => {}
            }
        }
        report.duration_seconds = start.elapsed().as_secs_f64();

        self.print_final_stats(&report);
        Ok(report)
    }

    /// Run `op` over `items` on the bounded worker pool.
    ///
    /// Each item is processed on a blocking thread; errors become
    /// `FileState::Failed` for that item only. Results come back in
    /// submission order, progress is reported in completion order.
    async fn run_pooled<I, F>(
        &self,
        items: Vec<(PathBuf, I)>,
        tracker: &ProgressTracker,
        op: F,
    ) -> Result<Vec<(PathBuf, FileState)>>
    where
        I: Send + 'static,
        F: Fn(&dyn ImageTool, &Config, I) -> Result<FileState, ResizeError>
            + Send
            + Sync
            + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let op = Arc::new(op);
        let mut tasks = Vec::with_capacity(items.len());

        for (path, item) in items {
            let permit = semaphore.clone().acquire_owned().await?;
            let tool = self.tool.clone();
            let config = self.config.clone();
            let op = op.clone();
            let tracker = tracker.clone();

            tasks.push(tokio::spawn(async move {
                let _permit = permit; // Keep permit alive

                let result =
                    tokio::task::spawn_blocking(move || (*op)(&*tool, &*config, item)).await;
                let state = match result {
                    Ok(Ok(state)) => state,
                    Ok(Err(e)) => FileState::Failed(e.to_string()),
                    Err(e) => FileState::Failed(format!("worker task failed: {}", e)),
                };

                tracker.record(&path, &state);
                (path, state)
            }));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for joined in futures::future::join_all(tasks).await {
            results.push(joined?);
        }
        Ok(results)
    }

    fn print_final_stats(&self, report: &BatchReport) {
        let stats = &report.stats;

        info!("=== Resize Complete ===");
        info!("{}", stats.format_summary());
        info!("Duration: {:.2}s", report.duration_seconds);

        if self.config.json_output {
            JsonMessage::complete(stats, report.duration_seconds).emit();
        }
    }
}
