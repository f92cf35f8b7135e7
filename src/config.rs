//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` passata esplicitamente a ogni stage
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `input_root`: Cartella con le immagini da ridimensionare
//! - `target_bytes`: Dimensione obiettivo in byte (> 0)
//! - `probe_only`: Calcola e riporta senza scrivere file (default: false)
//! - `verbose`: Logging DEBUG (default: false)
//! - `workers`: Numero di worker paralleli (default: parallelismo disponibile)
//! - `damping_factor`: Costante k del passo correttivo (default: 0.9)
//! - `output_dir`: Directory di output (default: `out`)
//! - `json_output`: Eventi JSON su stdout invece della progress bar
//! - `ffmpeg_path` / `ffprobe_path`: Path espliciti dei tool (opzionali)
//!
//! ## Esempio:
//! ```ignore
//! let config = Config {
//!     target_bytes: 1024 * 1024,
//!     workers: 8,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default damping constant for the single corrective step
pub const DEFAULT_DAMPING_FACTOR: f64 = 0.9;

/// Default directory for resized outputs
pub const DEFAULT_OUTPUT_DIR: &str = "out";

/// Configuration for a resize run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder containing images to resize
    pub input_root: PathBuf,
    /// Target file size in bytes
    pub target_bytes: u64,
    /// Compute and report transforms without writing files
    pub probe_only: bool,
    /// Verbose logging
    pub verbose: bool,
    /// Number of parallel workers
    pub workers: usize,
    /// Damping constant `k` of the corrective suggestion
    pub damping_factor: f64,
    /// Directory for resized outputs
    pub output_dir: PathBuf,
    /// Output progress and results as JSON lines
    pub json_output: bool,
    /// Explicit ffmpeg executable
    pub ffmpeg_path: Option<PathBuf>,
    /// Explicit ffprobe executable
    pub ffprobe_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_root: PathBuf::from("."),
            target_bytes: 1024 * 1024,
            probe_only: false,
            verbose: false,
            workers: default_workers(),
            damping_factor: DEFAULT_DAMPING_FACTOR,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            json_output: false,
            ffmpeg_path: None,
            ffprobe_path: None,
        }
    }
}

/// Available parallelism, or 1 when it cannot be determined
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.target_bytes == 0 {
            return Err(anyhow::anyhow!("Target size must be greater than zero"));
        }

        if self.workers == 0 {
            return Err(anyhow::anyhow!("Number of workers must be greater than 0"));
        }

        if !(self.damping_factor > 0.0 && self.damping_factor <= 1.0) {
            return Err(anyhow::anyhow!("Damping factor must be between 0.0 and 1.0"));
        }

        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(anyhow::anyhow!(
                "Output path is not a directory: {}",
                self.output_dir.display()
            ));
        }

        Ok(())
    }

    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("image-resizer").join("config.json"))
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.target_bytes = 0;
        assert!(config.validate().is_err());

        config.target_bytes = 1024;
        config.workers = 0;
        assert!(config.validate().is_err());

        config.workers = 2;
        config.damping_factor = 0.0;
        assert!(config.validate().is_err());

        config.damping_factor = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_file_as_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("not_a_dir");
        std::fs::write(&file, b"x").unwrap();

        let config = Config {
            output_dir: file,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.damping_factor, 0.9);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert!(!config.probe_only);
        assert!(!config.json_output);
        assert!(config.workers >= 1);
    }

    #[tokio::test]
    async fn test_config_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.json");

        let original_config = Config {
            target_bytes: 500 * 1024,
            workers: 8,
            damping_factor: 0.5,
            probe_only: true,
            ..Default::default()
        };

        original_config.save_to_file(&config_path).await.unwrap();
        let loaded_config = Config::from_file(&config_path).await.unwrap();

        assert_eq!(loaded_config.target_bytes, 500 * 1024);
        assert_eq!(loaded_config.workers, 8);
        assert_eq!(loaded_config.damping_factor, 0.5);
        assert!(loaded_config.probe_only);
    }

    #[test]
    fn test_config_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.json");

        let config = tokio_test::block_on(Config::from_file(&path)).unwrap();
        assert_eq!(config.damping_factor, DEFAULT_DAMPING_FACTOR);
    }

    #[test]
    fn test_config_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "workers": 3 }"#).unwrap();

        let config = tokio_test::block_on(Config::from_file(&path)).unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }
}
