//! # Target Size Resizer - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Merge tra file di configurazione e flag CLI
//! - Verifica di ffmpeg/ffprobe una sola volta prima della pipeline
//! - Avvio dell'orchestratore
//!
//! ## Esempio di utilizzo:
//! ```bash
//! image-resizer ./photos 500K --workers 8 --verbose
//! image-resizer ./photos 2M --probe-only --json
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use target_size_resizer::{
    json_output::JsonMessage, parse_size, BatchResizer, Config, FfmpegTool, ToolPathResolver,
};

#[derive(Parser)]
#[command(name = "image-resizer")]
#[command(about = "Resize images toward a target file size using ffmpeg")]
struct Args {
    /// Folder containing images to resize
    input_folder: PathBuf,

    /// Target file size (e.g. '500K', '5M', '2G')
    #[arg(value_parser = parse_size)]
    target_size: u64,

    /// Perform a probe without writing any file
    #[arg(long)]
    probe_only: bool,

    /// Number of parallel workers (default: available parallelism)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Damping constant of the suggested corrective step (0-1]
    #[arg(long)]
    damping: Option<f64>,

    /// Output directory for resized files
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output progress and results as JSON lines
    #[arg(long)]
    json: bool,

    /// Path to the ffmpeg executable
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe executable
    #[arg(long)]
    ffprobe: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.json)?;

    let config = build_config(args).await?;
    config.validate()?;
    debug!("Configuration: {:?}", config);

    let toolchain = match ToolPathResolver::new().ensure_ready(&config).await {
        Ok(toolchain) => toolchain,
        Err(e) => {
            if config.json_output {
                JsonMessage::error("external tool not ready".to_string(), Some(e.to_string()))
                    .emit();
            }
            return Err(e.into());
        }
    };

    let resizer = BatchResizer::new(config, Arc::new(FfmpegTool::new(toolchain)))?;
    resizer.run().await?;

    Ok(())
}

fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    // stdout is reserved for JSON events
    if json {
        tracing::subscriber::set_global_default(builder.with_writer(std::io::stderr).finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    Ok(())
}

/// Config file values first, CLI flags on top
async fn build_config(args: Args) -> Result<Config> {
    let mut config = match args.config.or_else(Config::default_path) {
        Some(path) => Config::from_file(&path).await?,
        None => Config::default(),
    };

    config.input_root = args.input_folder;
    config.target_bytes = args.target_size;
    config.probe_only |= args.probe_only;
    config.verbose |= args.verbose;
    config.json_output |= args.json;

    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(damping) = args.damping {
        config.damping_factor = damping;
    }
    if let Some(output) = args.output {
        config.output_dir = output;
    }
    if args.ffmpeg.is_some() {
        config.ffmpeg_path = args.ffmpeg;
    }
    if args.ffprobe.is_some() {
        config.ffprobe_path = args.ffprobe;
    }

    Ok(config)
}
