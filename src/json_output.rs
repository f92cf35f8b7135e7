//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per uso programmatico (`--json`).
//!
//! ## Responsabilità:
//! - Emette un messaggio JSON per riga su stdout per ogni evento
//! - Riusa `ProbeResult` e `ResizeOutcome` senza duplicarne i campi
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio del run
//! - `file_probed`: Probe completato (geometria obiettivo)
//! - `file_resized`: Resize completato
//! - `file_skipped`: File saltato (già piccolo, dimensioni non valide)
//! - `file_error`: Errore su un singolo file
//! - `complete`: Fine run con statistiche finali
//! - `error`: Errore fatale

use crate::config::Config;
use crate::processor::{ProbeResult, ResizeOutcome};
use crate::progress::ResizeStats;
use serde::Serialize;
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    Start {
        input_dir: PathBuf,
        output_dir: PathBuf,
        total_files: usize,
        config: JsonConfig,
    },
    FileProbed {
        #[serde(flatten)]
        result: ProbeResult,
    },
    FileResized {
        #[serde(flatten)]
        outcome: ResizeOutcome,
    },
    FileSkipped {
        path: PathBuf,
        reason: String,
    },
    FileError {
        path: PathBuf,
        error: String,
    },
    Complete {
        files_found: usize,
        files_probed: usize,
        files_resized: usize,
        files_skipped: usize,
        errors: usize,
        total_original_size: u64,
        total_resulting_size: u64,
        duration_seconds: f64,
    },
    Error {
        message: String,
        details: Option<String>,
    },
}

/// Configurazione riportata nel messaggio `start`
#[derive(Debug, Serialize)]
pub struct JsonConfig {
    pub target_bytes: u64,
    pub workers: usize,
    pub damping_factor: f64,
    pub probe_only: bool,
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(config: &Config, total_files: usize) -> Self {
        Self::Start {
            input_dir: config.input_root.clone(),
            output_dir: config.output_dir.clone(),
            total_files,
            config: JsonConfig::from(config),
        }
    }

    pub fn complete(stats: &ResizeStats, duration_seconds: f64) -> Self {
        Self::Complete {
            files_found: stats.files_found,
            files_probed: stats.files_probed,
            files_resized: stats.files_resized,
            files_skipped: stats.files_skipped,
            errors: stats.errors,
            total_original_size: stats.total_original_size,
            total_resulting_size: stats.total_resulting_size,
            duration_seconds,
        }
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}

impl From<&Config> for JsonConfig {
    fn from(config: &Config) -> Self {
        Self {
            target_bytes: config.target_bytes,
            workers: config.workers,
            damping_factor: config.damping_factor,
            probe_only: config.probe_only,
        }
    }
}
