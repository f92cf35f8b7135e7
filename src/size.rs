//! # Size Utilities Module
//!
//! Conversione tra stringhe human-readable e byte, e stima del fattore di scala.
//!
//! ## Responsabilità:
//! - `parse_size()`: "500K", "5M", "2G", "1.5MB" → byte (moltiplicatori binari 1024^n)
//! - `estimate_scale_factor()`: sqrt(target / current), stima single-shot
//! - `format_size()`: byte → stringa leggibile per report e log
//!
//! ## Nota sulla stima:
//! La dimensione in byte scala con il quadrato del fattore lineare solo per bitmap
//! non compresse. Per formati compressi è un'approssimazione: il risultato è
//! best-effort, non un limite garantito.

use crate::error::ResizeError;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

fn size_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(\d*\.?\d+)\s*([KMGT]?)B?$").expect("size pattern is a valid regex")
    })
}

/// Convert a string like `500M` or `12G` to bytes.
///
/// The unit is optional and case-insensitive; a trailing `B` is accepted.
/// Multipliers are binary (`K` = 1024).
pub fn parse_size(size_str: &str) -> Result<u64, ResizeError> {
    let caps = size_pattern().captures(size_str).ok_or_else(|| {
        ResizeError::InvalidFormat(format!(
            "'{}'. Use something like '500K', '5M' or '2G'",
            size_str
        ))
    })?;

    let number: f64 = caps[1]
        .parse()
        .map_err(|_| ResizeError::InvalidFormat(format!("'{}' is not a number", &caps[1])))?;

    let rank = match caps[2].to_ascii_uppercase().as_str() {
        "K" => 1,
        "M" => 2,
        "G" => 3,
        "T" => 4,
        _ => 0,
    };

    let bytes = (number * 1024f64.powi(rank)).floor() as u64;
    if bytes == 0 {
        return Err(ResizeError::Validation(
            "target size must be greater than zero".to_string(),
        ));
    }

    debug!("Parsed target size: {} -> {} bytes", size_str, bytes);
    Ok(bytes)
}

/// Estimate the linear scale factor that brings `current_size` to `target_size`.
pub fn estimate_scale_factor(current_size: u64, target_size: u64) -> Result<f64, ResizeError> {
    if current_size == 0 {
        return Err(ResizeError::Validation(
            "current size must be greater than zero".to_string(),
        ));
    }
    Ok((target_size as f64 / current_size as f64).sqrt())
}

/// Get human-readable file size
pub fn format_size(size: u64) -> String {
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
