//! # Processor Module
//!
//! Stage per singolo file della pipeline:
//! - `probe`: dimensioni + peso → fattore di scala e geometria obiettivo
//! - `resize`: trasformazione esterna + passo correttivo consultivo

pub mod probe;
pub mod resize;

pub use probe::{probe_image, ImageRecord, ProbeResult};
pub use resize::{corrective_dimensions, resize_image, ResizeOutcome};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::codec::{ImageTool, ProbeData};
    use crate::error::ResizeError;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory `ImageTool` that records every call
    pub struct FakeTool {
        data: ProbeData,
        output_size: usize,
        failing: Vec<String>,
        probes: AtomicUsize,
        scales: Mutex<Vec<(PathBuf, u32, u32)>>,
    }

    impl FakeTool {
        pub fn new(width: u32, height: u32, size: u64) -> Self {
            Self {
                data: ProbeData { width, height, size },
                output_size: 16,
                failing: Vec::new(),
                probes: AtomicUsize::new(0),
                scales: Mutex::new(Vec::new()),
            }
        }

        pub fn with_output_size(mut self, output_size: usize) -> Self {
            self.output_size = output_size;
            self
        }

        /// Fail every call on files with this name
        pub fn failing_on(mut self, file_name: &str) -> Self {
            self.failing.push(file_name.to_string());
            self
        }

        pub fn probe_calls(&self) -> usize {
            self.probes.load(Ordering::SeqCst)
        }

        pub fn scale_calls(&self) -> Vec<(PathBuf, u32, u32)> {
            self.scales.lock().unwrap().clone()
        }

        fn check(&self, path: &Path) -> Result<(), ResizeError> {
            let name = path.file_name().unwrap_or_default().to_string_lossy();
            if self.failing.iter().any(|f| *f == name) {
                return Err(ResizeError::ExternalTool(format!("simulated failure on {}", name)));
            }
            Ok(())
        }
    }

    impl ImageTool for FakeTool {
        fn probe(&self, path: &Path) -> Result<ProbeData, ResizeError> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.check(path)?;
            Ok(self.data)
        }

        fn scale(
            &self,
            input: &Path,
            output: &Path,
            width: u32,
            height: u32,
        ) -> Result<(), ResizeError> {
            self.check(input)?;
            self.scales
                .lock()
                .unwrap()
                .push((input.to_path_buf(), width, height));
            std::fs::write(output, vec![0u8; self.output_size])?;
            Ok(())
        }
    }
}
