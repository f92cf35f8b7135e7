//! # Target Size Resizer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per i test
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione esplicita passata a ogni stage
//! - `error`: Tipi di errore custom
//! - `size`: Parsing "500K"/"5M"/"2G" e stima del fattore di scala
//! - `tool_resolver`: Ricerca e verifica di ffmpeg/ffprobe
//! - `codec`: Trait `ImageTool` e implementazione ffmpeg
//! - `file_manager`: Discovery immagini, pre-filtro, path di output
//! - `processor`: Stage di probe e resize per singolo file
//! - `state`: Stato finale per file
//! - `resizer`: Orchestratore batch su worker pool
//! - `progress` / `json_output`: Reporting
//!
//! ## Utilizzo:
//! ```ignore
//! use target_size_resizer::{BatchResizer, Config, FfmpegTool, ToolPathResolver};
//!
//! let toolchain = ToolPathResolver::new().ensure_ready(&config).await?;
//! let resizer = BatchResizer::new(config, Arc::new(FfmpegTool::new(toolchain)))?;
//! let report = resizer.run().await?;
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod processor;
pub mod progress;
pub mod resizer;
pub mod size;
pub mod state;
pub mod tool_resolver;

pub use codec::{FfmpegTool, ImageTool, ProbeData};
pub use config::Config;
pub use error::ResizeError;
pub use processor::{ImageRecord, ProbeResult, ResizeOutcome};
pub use resizer::{BatchReport, BatchResizer};
pub use size::{estimate_scale_factor, parse_size};
pub use state::{FileState, SkipReason};
pub use tool_resolver::{Toolchain, ToolPathResolver};
