//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `ResizeError` enum per categorizzare tutti gli errori possibili
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `InvalidFormat`: Stringa di dimensione non valida (es. "abc")
//! - `Validation`: Dimensione non positiva, geometria di resize non valida
//! - `ExternalTool`: Exit code non zero da ffprobe/ffmpeg
//! - `Probe`: Output di ffprobe non interpretabile
//! - `MissingDependency`: Tool esterno mancante (ffmpeg, ffprobe)
//! - `Checksum`: SHA-256 di un tool bundled non corrispondente
//! - `Io`: Errori di I/O (file non trovati, permessi, etc.)
//!
//! ## Esempio:
//! ```ignore
//! if current_size == 0 {
//!     return Err(ResizeError::Validation("current size must be greater than zero".into()));
//! }
//! ```

/// Custom error types for target-size resizing
#[derive(thiserror::Error, Debug)]
pub enum ResizeError {
    #[error("Invalid size format: {0}")]
    InvalidFormat(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("External tool error: {0}")]
    ExternalTool(String),

    #[error("Probe error: {0}")]
    Probe(String),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Checksum mismatch: {0}")]
    Checksum(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
