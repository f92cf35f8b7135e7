//! # External Image Tool Module
//!
//! Confine con il tool esterno: tutta la logica di codec è delegata a ffmpeg.
//!
//! ## Responsabilità:
//! - Definisce il trait `ImageTool` con due operazioni: `probe` e `scale`
//! - `FfmpegTool`: implementazione che invoca ffprobe/ffmpeg come sottoprocessi
//! - Interpreta l'output JSON di ffprobe (width, height, size)
//!
//! ## Comandi:
//! - Probe: `ffprobe -v error -select_streams v:0 -show_entries stream=width,height:format=size -of json <file>`
//! - Scale: `ffmpeg -y -loglevel error -i <in> -vf scale=W:H <out>`
//!
//! Le chiamate sono bloccanti: l'orchestratore le esegue su thread dedicati.
//! Nessun timeout: un tool bloccato occupa il suo worker indefinitamente.

use crate::error::ResizeError;
use crate::tool_resolver::Toolchain;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Pixel dimensions and byte size reported by a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeData {
    pub width: u32,
    pub height: u32,
    pub size: u64,
}

/// An external image tool able to probe and scale files
pub trait ImageTool: Send + Sync {
    /// Read-only query of an image's dimensions and byte size
    fn probe(&self, path: &Path) -> Result<ProbeData, ResizeError>;

    /// Write `input` scaled to `width`x`height` into `output`
    fn scale(&self, input: &Path, output: &Path, width: u32, height: u32)
        -> Result<(), ResizeError>;
}

/// `ImageTool` backed by the ffmpeg/ffprobe executables
#[derive(Debug, Clone)]
pub struct FfmpegTool {
    toolchain: Toolchain,
}

impl FfmpegTool {
    pub fn new(toolchain: Toolchain) -> Self {
        Self { toolchain }
    }
}

impl ImageTool for FfmpegTool {
    fn probe(&self, path: &Path) -> Result<ProbeData, ResizeError> {
        debug!("ffprobe {}", path.display());

        let output = Command::new(&self.toolchain.ffprobe)
            .args([
                "-v", "error",
                "-select_streams", "v:0",
                "-show_entries", "stream=width,height:format=size",
                "-of", "json",
            ])
            .arg(path)
            .output()
            .map_err(|e| {
                ResizeError::ExternalTool(format!(
                    "failed to execute {:?}: {}",
                    self.toolchain.ffprobe, e
                ))
            })?;

        if !output.status.success() {
            return Err(ResizeError::ExternalTool(format!(
                "ffprobe failed on {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let probe = parse_probe_output(&String::from_utf8_lossy(&output.stdout))?;
        match probe.size {
            Some(size) => Ok(ProbeData { width: probe.width, height: probe.height, size }),
            // some demuxers (image2 on older builds) omit format.size
            None => Ok(ProbeData {
                width: probe.width,
                height: probe.height,
                size: std::fs::metadata(path)?.len(),
            }),
        }
    }

    fn scale(
        &self,
        input: &Path,
        output: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), ResizeError> {
        if width == 0 || height == 0 {
            return Err(ResizeError::Validation(format!(
                "invalid resize dimensions {}x{}",
                width, height
            )));
        }

        let filter = format!("scale={}:{}", width, height);
        debug!("ffmpeg {} -vf {} -> {}", input.display(), filter, output.display());

        let result = Command::new(&self.toolchain.ffmpeg)
            .args(["-y", "-loglevel", "error", "-i"])
            .arg(input)
            .args(["-vf", &filter])
            .arg(output)
            .output()
            .map_err(|e| {
                ResizeError::ExternalTool(format!(
                    "failed to execute {:?}: {}",
                    self.toolchain.ffmpeg, e
                ))
            })?;

        if !result.status.success() {
            return Err(ResizeError::ExternalTool(format!(
                "ffmpeg failed on {}: {}",
                input.display(),
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }

        Ok(())
    }
}

struct ParsedProbe {
    width: u32,
    height: u32,
    size: Option<u64>,
}

/// Extract width, height and (optional) size from ffprobe's JSON output
fn parse_probe_output(json: &str) -> Result<ParsedProbe, ResizeError> {
    let info: serde_json::Value = serde_json::from_str(json)?;

    let stream = info["streams"]
        .as_array()
        .and_then(|streams| streams.first())
        .ok_or_else(|| ResizeError::Probe("no video stream in probe output".to_string()))?;

    let dimension = |key: &str| -> Result<u32, ResizeError> {
        stream[key]
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| ResizeError::Probe(format!("missing or invalid stream {}", key)))
    };

    // ffprobe prints format.size as a string
    let size = match &info["format"]["size"] {
        serde_json::Value::String(s) => s.parse::<u64>().ok(),
        serde_json::Value::Number(n) => n.as_u64(),
        _ => None,
    };

    Ok(ParsedProbe {
        width: dimension("width")?,
        height: dimension("height")?,
        size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_output() {
        let json = r#"{
            "programs": [],
            "streams": [ { "width": 1920, "height": 1080 } ],
            "format": { "size": "4000000" }
        }"#;

        let probe = parse_probe_output(json).unwrap();
        assert_eq!(probe.width, 1920);
        assert_eq!(probe.height, 1080);
        assert_eq!(probe.size, Some(4_000_000));
    }

    #[test]
    fn test_parse_probe_output_without_size() {
        let json = r#"{ "streams": [ { "width": 10, "height": 20 } ], "format": {} }"#;
        let probe = parse_probe_output(json).unwrap();
        assert_eq!((probe.width, probe.height, probe.size), (10, 20, None));
    }

    #[test]
    fn test_parse_probe_output_errors() {
        assert!(matches!(
            parse_probe_output(r#"{ "streams": [] }"#),
            Err(ResizeError::Probe(_))
        ));
        assert!(matches!(
            parse_probe_output(r#"{ "streams": [ { "height": 5 } ] }"#),
            Err(ResizeError::Probe(_))
        ));
        assert!(matches!(
            parse_probe_output("not json"),
            Err(ResizeError::Json(_))
        ));
    }

    #[cfg(unix)]
    mod subprocess {
        use crate::codec::{FfmpegTool, ImageTool, ProbeData};
        use crate::error::ResizeError;
        use crate::tool_resolver::test_scripts::write_script;
        use crate::tool_resolver::Toolchain;
        use std::path::{Path, PathBuf};
        use tempfile::TempDir;

        const NO_TOOL: &str = "/nonexistent/tool";

        fn tool(ffmpeg: PathBuf, ffprobe: PathBuf) -> FfmpegTool {
            FfmpegTool::new(Toolchain { ffmpeg, ffprobe })
        }

        /// Script body that appends its arguments to `log` before running `rest`
        fn logging_body(log: &Path, rest: &str) -> String {
            format!("echo \"$@\" >> '{}'\n{}", log.display(), rest)
        }

        #[test]
        fn test_probe_runs_ffprobe() {
            let temp_dir = TempDir::new().unwrap();
            let log = temp_dir.path().join("args.log");
            let ffprobe = write_script(
                temp_dir.path(),
                "ffprobe",
                &logging_body(
                    &log,
                    r#"echo '{"streams":[{"width":640,"height":480}],"format":{"size":"12345"}}'"#,
                ),
            );
            let input = temp_dir.path().join("photo.jpg");

            let data = tool(NO_TOOL.into(), ffprobe).probe(&input).unwrap();

            assert_eq!(data, ProbeData { width: 640, height: 480, size: 12345 });
            let args = std::fs::read_to_string(&log).unwrap();
            assert_eq!(
                args.trim(),
                format!(
                    "-v error -select_streams v:0 -show_entries stream=width,height:format=size -of json {}",
                    input.display()
                )
            );
        }

        #[test]
        fn test_probe_falls_back_to_file_size() {
            let temp_dir = TempDir::new().unwrap();
            let ffprobe = write_script(
                temp_dir.path(),
                "ffprobe",
                r#"echo '{"streams":[{"width":32,"height":16}],"format":{}}'"#,
            );
            let input = temp_dir.path().join("anim.gif");
            std::fs::write(&input, vec![0u8; 777]).unwrap();

            let data = tool(NO_TOOL.into(), ffprobe).probe(&input).unwrap();
            assert_eq!(data, ProbeData { width: 32, height: 16, size: 777 });
        }

        #[test]
        fn test_probe_failure_carries_stderr() {
            let temp_dir = TempDir::new().unwrap();
            let ffprobe = write_script(
                temp_dir.path(),
                "ffprobe",
                "echo 'Invalid data found when processing input' >&2\nexit 1",
            );

            let result = tool(NO_TOOL.into(), ffprobe).probe(Path::new("broken.png"));
            match result {
                Err(ResizeError::ExternalTool(message)) => {
                    assert!(message.contains("broken.png"), "{message}");
                    assert!(message.contains("Invalid data found"), "{message}");
                }
                other => panic!("unexpected result: {:?}", other),
            }
        }

        #[test]
        fn test_scale_runs_ffmpeg() {
            let temp_dir = TempDir::new().unwrap();
            let log = temp_dir.path().join("args.log");
            // the last argument is the output file
            let ffmpeg = write_script(
                temp_dir.path(),
                "ffmpeg",
                &logging_body(&log, "for last; do :; done\nprintf 'scaled' > \"$last\""),
            );
            let input = temp_dir.path().join("in.png");
            let output = temp_dir.path().join("out.png");

            tool(ffmpeg, NO_TOOL.into())
                .scale(&input, &output, 320, 240)
                .unwrap();

            assert_eq!(std::fs::read(&output).unwrap(), b"scaled");
            let args = std::fs::read_to_string(&log).unwrap();
            assert_eq!(
                args.trim(),
                format!(
                    "-y -loglevel error -i {} -vf scale=320:240 {}",
                    input.display(),
                    output.display()
                )
            );
        }

        #[test]
        fn test_scale_failure_carries_stderr() {
            let temp_dir = TempDir::new().unwrap();
            let ffmpeg = write_script(
                temp_dir.path(),
                "ffmpeg",
                "echo 'Conversion failed!' >&2\nexit 1",
            );

            let result = tool(ffmpeg, NO_TOOL.into()).scale(
                Path::new("in.png"),
                &temp_dir.path().join("out.png"),
                10,
                10,
            );
            match result {
                Err(ResizeError::ExternalTool(message)) => {
                    assert!(message.contains("Conversion failed!"), "{message}");
                }
                other => panic!("unexpected result: {:?}", other),
            }
        }

        #[test]
        fn test_missing_executable_is_external_tool_error() {
            let result = tool(NO_TOOL.into(), NO_TOOL.into()).probe(Path::new("a.png"));
            assert!(matches!(result, Err(ResizeError::ExternalTool(_))));
        }
    }

    #[test]
    fn test_scale_rejects_zero_dimensions() {
        let tool = FfmpegTool::new(Toolchain {
            ffmpeg: "/nonexistent/ffmpeg".into(),
            ffprobe: "/nonexistent/ffprobe".into(),
        });
        let result = tool.scale(Path::new("in.png"), Path::new("out.png"), 0, 10);
        assert!(matches!(result, Err(ResizeError::Validation(_))));
    }
}
