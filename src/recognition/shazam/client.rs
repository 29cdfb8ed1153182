//! Recognition client backed by the `songrec` CLI
//!
//! SongRec computes the acoustic signature locally and submits it to the
//! Shazam tag endpoint; `audio-file-to-recognized-song` prints the raw JSON
//! response on stdout, which we parse with our own DTOs.
//!
//! Install songrec:
//! - Linux: `apt install songrec`, Flatpak, or `cargo install songrec`
//! - macOS/Windows: `cargo install songrec --no-default-features -F ffmpeg`

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::{adapter, dto};
use crate::recognition::domain::{RecognitionError, RecognitionMatch};
use crate::recognition::traits::RecognitionApi;

/// SongRec subcommand that prints the raw recognition response
const RECOGNIZE_SUBCOMMAND: &str = "audio-file-to-recognized-song";

/// songrec CLI wrapper
pub struct SongRecClient {
    program: String,
}

impl SongRecClient {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check if songrec is available on the system
    pub fn is_available(&self) -> bool {
        self.version().is_some()
    }

    /// Get songrec version string (for diagnostics)
    pub fn version(&self) -> Option<String> {
        std::process::Command::new(&self.program)
            .arg("--version")
            .output()
            .ok()
            .filter(|o| o.status.success())
            .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
    }

    /// Identify the audio file at `path`
    pub async fn recognize(
        &self,
        path: &Path,
    ) -> Result<Option<RecognitionMatch>, RecognitionError> {
        let response = self.send_recognize_request(path).await?;
        adapter::to_match(response)
    }

    async fn send_recognize_request(
        &self,
        path: &Path,
    ) -> Result<dto::TagResponse, RecognitionError> {
        let output = Command::new(&self.program)
            .arg(RECOGNIZE_SUBCOMMAND)
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RecognitionError::ToolMissing(format!("{} not found on PATH", self.program))
                } else {
                    RecognitionError::Service(format!("Failed to run {}: {}", self.program, e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecognitionError::Service(format!(
                "songrec failed: {}",
                stderr.trim().chars().take(200).collect::<String>()
            )));
        }

        parse_response(&String::from_utf8_lossy(&output.stdout))
    }
}

#[async_trait]
impl RecognitionApi for SongRecClient {
    async fn recognize(&self, path: &Path) -> Result<Option<RecognitionMatch>, RecognitionError> {
        self.recognize(path).await
    }
}

fn parse_response(json: &str) -> Result<dto::TagResponse, RecognitionError> {
    serde_json::from_str(json).map_err(|e| RecognitionError::Parse(e.to_string()))
}
