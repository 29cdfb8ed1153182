//! yt-dlp download backend
//!
//! Shells out to the `yt-dlp` command-line tool, which knows how to pull
//! media from Instagram, YouTube, TikTok and hundreds of other sites.
//! Audio extraction to mp3 needs `ffmpeg` on PATH as well.
//!
//! Install yt-dlp:
//! - Windows: `winget install yt-dlp.yt-dlp`
//! - macOS: `brew install yt-dlp`
//! - Linux: `pipx install yt-dlp` or the distro package
//!
//! Logins are passed through a private temporary config file, never argv.

use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::process::Command;

use super::MediaInfo;
use crate::config::PlatformCredentials;
use crate::recognition::domain::{AcquireError, Platform, SourceLink};
use crate::recognition::traits::MediaDownloader;

/// mp3 quality used for extracted audio (yt-dlp `--audio-quality`)
const AUDIO_QUALITY: &str = "192K";

/// yt-dlp CLI wrapper
pub struct YtDlp {
    program: String,
}

impl YtDlp {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check if yt-dlp is available on the system
    pub fn is_available(&self) -> bool {
        self.version().is_some()
    }

    /// Get yt-dlp version string (for diagnostics)
    pub fn version(&self) -> Option<String> {
        std::process::Command::new(&self.program)
            .arg("--version")
            .output()
            .ok()
            .filter(|o| o.status.success())
            .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
    }

    async fn run(&self, args: Vec<String>) -> Result<Vec<u8>, AcquireError> {
        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AcquireError::ToolMissing(format!("{} not found on PATH", self.program))
                } else {
                    AcquireError::Download(format!("Failed to run {}: {}", self.program, e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AcquireError::Download(format!(
                "yt-dlp failed: {}",
                tail(stderr.trim(), 300)
            )));
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl MediaDownloader for YtDlp {
    async fn probe(&self, link: &SourceLink) -> Result<MediaInfo, AcquireError> {
        let stdout = self.run(probe_args(link)).await?;
        parse_probe_json(&String::from_utf8_lossy(&stdout))
    }

    async fn download(
        &self,
        link: &SourceLink,
        output_template: &Path,
        credentials: Option<&PlatformCredentials>,
    ) -> Result<(), AcquireError> {
        // Deleted when dropped, after yt-dlp has exited
        let login = credentials.map(write_login_config).transpose()?;
        self.run(download_args(
            link,
            output_template,
            login.as_ref().map(NamedTempFile::path),
        ))
        .await
        .map(|_| ())
    }
}

fn probe_args(link: &SourceLink) -> Vec<String> {
    [
        "--dump-single-json",
        "--skip-download",
        "--no-playlist",
        "--no-warnings",
        link.as_str(),
    ]
    .map(String::from)
    .to_vec()
}

/// Build the download command line.
///
/// The login never appears on the command line: it is read by yt-dlp from
/// `login_config`, a private file written by [`write_login_config`].
fn download_args(
    link: &SourceLink,
    output_template: &Path,
    login_config: Option<&Path>,
) -> Vec<String> {
    let mut args: Vec<String> = [
        "--extract-audio",
        "--audio-format",
        "mp3",
        "--audio-quality",
        AUDIO_QUALITY,
        "--no-playlist",
        "--no-continue",
        "--quiet",
        "--no-warnings",
        "--output",
    ]
    .map(String::from)
    .to_vec();
    args.push(output_template.to_string_lossy().into_owned());

    if let Some(config) = login_config {
        args.push("--config-locations".to_string());
        args.push(config.to_string_lossy().into_owned());
    }

    args.push(link.as_str().to_string());
    args
}

/// yt-dlp config file body carrying the login
fn login_config_body(creds: &PlatformCredentials) -> String {
    format!(
        "--username {}\n--password {}\n",
        quote(&creds.username),
        quote(&creds.password)
    )
}

/// Double-quote a value for yt-dlp's shell-like config parser
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Write the login to a temporary file only the current user can read
fn write_login_config(creds: &PlatformCredentials) -> Result<NamedTempFile, AcquireError> {
    let mut file = tempfile::Builder::new()
        .prefix("tunelink-login-")
        .suffix(".conf")
        .tempfile()?;
    file.write_all(login_config_body(creds).as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Parse the JSON printed by `--dump-single-json`
fn parse_probe_json(json: &str) -> Result<MediaInfo, AcquireError> {
    let parsed: ProbeOutput = serde_json::from_str(json).map_err(|e| {
        AcquireError::Download(format!("Failed to parse yt-dlp output: {}", e))
    })?;

    let extractor = parsed
        .extractor_key
        .or(parsed.extractor)
        .ok_or_else(|| AcquireError::Download("yt-dlp did not report an extractor".to_string()))?;

    Ok(MediaInfo {
        platform: Platform::from_extractor(&extractor),
        duration: parsed
            .duration
            .filter(|d| d.is_finite() && *d >= 0.0)
            .map(Duration::from_secs_f64),
        title: parsed.title,
    })
}

/// Subset of yt-dlp's info dict
#[derive(serde::Deserialize)]
struct ProbeOutput {
    extractor: Option<String>,
    extractor_key: Option<String>,
    duration: Option<f64>,
    title: Option<String>,
}

/// Last `max` characters of a message
fn tail(message: &str, max: usize) -> String {
    let count = message.chars().count();
    message.chars().skip(count.saturating_sub(max)).collect()
}
