//! Audio tools backed by lofty (duration) and the `ffmpeg` CLI (trimming).
//!
//! Install ffmpeg:
//! - Windows: `winget install Gyan.FFmpeg`
//! - macOS: `brew install ffmpeg`
//! - Linux: `apt install ffmpeg` or equivalent

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use lofty::file::AudioFile;
use lofty::probe::Probe;
use tokio::process::Command;

use crate::recognition::domain::SegmentError;
use crate::recognition::traits::AudioTools;

/// Bitrate for re-encoded segments, matching the download quality
const SEGMENT_BITRATE: &str = "192k";

pub struct FfmpegTools {
    program: String,
}

impl FfmpegTools {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check if ffmpeg is available on the system
    pub fn is_available(&self) -> bool {
        self.version().is_some()
    }

    /// First line of `ffmpeg -version` (for diagnostics)
    pub fn version(&self) -> Option<String> {
        std::process::Command::new(&self.program)
            .arg("-version")
            .output()
            .ok()
            .filter(|o| o.status.success())
            .and_then(|o| {
                String::from_utf8_lossy(&o.stdout)
                    .lines()
                    .next()
                    .map(|l| l.trim().to_string())
            })
    }
}

#[async_trait]
impl AudioTools for FfmpegTools {
    async fn duration(&self, path: &Path) -> Result<Duration, SegmentError> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || read_duration(&path))
            .await
            .map_err(|e| SegmentError::Probe(format!("Task join error: {}", e)))?
    }

    async fn trim_start(
        &self,
        input: &Path,
        start: Duration,
        output: &Path,
    ) -> Result<(), SegmentError> {
        let output_result = Command::new(&self.program)
            .args(trim_args(input, start, output))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| SegmentError::Trim(format!("Failed to run {}: {}", self.program, e)))?;

        if !output_result.status.success() {
            let stderr = String::from_utf8_lossy(&output_result.stderr);
            return Err(SegmentError::Trim(format!("ffmpeg failed: {}", stderr.trim())));
        }
        Ok(())
    }
}

fn read_duration(path: &Path) -> Result<Duration, SegmentError> {
    let tagged_file = Probe::open(path)
        .map_err(|e| SegmentError::Probe(format!("{:?}: {}", path, e)))?
        .read()
        .map_err(|e| SegmentError::Probe(format!("{:?}: {}", path, e)))?;
    Ok(tagged_file.properties().duration())
}

fn trim_args(input: &Path, start: Duration, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-ss".to_string(),
        format!("{:.3}", start.as_secs_f64()),
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
        "-vn".to_string(),
        "-c:a".to_string(),
        "libmp3lame".to_string(),
        "-b:a".to_string(),
        SEGMENT_BITRATE.to_string(),
        output.to_string_lossy().into_owned(),
    ]
}
