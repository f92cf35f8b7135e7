//! End-to-end pipeline runs with a scripted image tool in place of ffmpeg.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use target_size_resizer::{
    parse_size, BatchResizer, Config, FileState, ImageTool, ProbeData, ResizeError,
};
use tempfile::TempDir;

/// Reports fixed dimensions, the real on-disk size, and records scale requests
struct ScriptedTool {
    width: u32,
    height: u32,
    output_size: usize,
    requests: Mutex<Vec<(u32, u32)>>,
}

impl ScriptedTool {
    fn new(width: u32, height: u32, output_size: usize) -> Self {
        Self {
            width,
            height,
            output_size,
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl ImageTool for ScriptedTool {
    fn probe(&self, path: &Path) -> Result<ProbeData, ResizeError> {
        Ok(ProbeData {
            width: self.width,
            height: self.height,
            size: std::fs::metadata(path)?.len(),
        })
    }

    fn scale(&self, _input: &Path, output: &Path, width: u32, height: u32) -> Result<(), ResizeError> {
        self.requests.lock().unwrap().push((width, height));
        std::fs::write(output, vec![0u8; self.output_size])?;
        Ok(())
    }
}

fn image_folder(size: usize) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let image = dir.path().join("photo.jpg");
    std::fs::write(&image, vec![0u8; size]).unwrap();
    (dir, image)
}

#[tokio::test]
async fn test_one_megabyte_target() {
    let (dir, image) = image_folder(4_000_000);
    let tool = Arc::new(ScriptedTool::new(1000, 1000, 1_100_000));
    let config = Config {
        input_root: dir.path().to_path_buf(),
        target_bytes: parse_size("1M").unwrap(),
        output_dir: dir.path().join("out"),
        ..Default::default()
    };
    assert_eq!(config.target_bytes, 1_048_576);

    let report = BatchResizer::new(config, tool.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    let requests = tool.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    let (width, height) = requests[0];
    assert!((511..=512).contains(&width), "width {width}");
    assert_eq!(width, height);

    match report.get(&image) {
        Some(FileState::Resized(outcome)) => {
            assert_eq!(outcome.original_size, 4_000_000);
            assert_eq!(outcome.resulting_size, 1_100_000);
            assert_eq!(outcome.iterations, 1);
            assert!((outcome.compression_ratio - 0.275).abs() < 1e-9);
            assert_eq!(outcome.output_path, dir.path().join("out").join("resized_photo.jpg"));
            assert!(outcome.output_path.exists());

            // one damped correction, never applied
            let (sw, sh) = outcome.suggested_dimensions.unwrap();
            assert!(sw < width && sh < height);
        }
        other => panic!("unexpected state: {:?}", other),
    }
}

#[tokio::test]
async fn test_probe_only_reports_scale() {
    let (dir, image) = image_folder(4_000_000);
    let tool = Arc::new(ScriptedTool::new(1000, 1000, 0));
    let config = Config {
        input_root: dir.path().to_path_buf(),
        target_bytes: parse_size("1M").unwrap(),
        output_dir: dir.path().join("out"),
        probe_only: true,
        ..Default::default()
    };

    let report = BatchResizer::new(config, tool.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    match report.get(&image) {
        Some(FileState::Probed(result)) => {
            let expected = (1_048_576f64 / 4_000_000f64).sqrt();
            assert!((result.scale_factor - expected).abs() < 1e-12);
            assert!((result.scale_factor - 0.512).abs() < 1e-3);
        }
        other => panic!("unexpected state: {:?}", other),
    }
    assert!(tool.requests.lock().unwrap().is_empty());
    assert!(!dir.path().join("out").exists());
}

#[tokio::test]
async fn test_file_at_target_is_left_alone() {
    let (dir, image) = image_folder(1_048_576);
    let tool = Arc::new(ScriptedTool::new(1000, 1000, 10));
    let config = Config {
        input_root: dir.path().to_path_buf(),
        target_bytes: parse_size("1M").unwrap(),
        output_dir: dir.path().join("out"),
        ..Default::default()
    };

    let report = BatchResizer::new(config, tool.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(matches!(report.get(&image), Some(FileState::Skipped(_))));
    assert!(tool.requests.lock().unwrap().is_empty());
}
