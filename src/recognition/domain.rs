//! Internal domain models for the song identification pipeline.
//!
//! These types are OUR types - they don't change when the download or
//! recognition backends change. Backend output gets converted into these
//! types via adapters.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A link found in a user's message, pointing at media to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLink {
    raw: String,
}

impl SourceLink {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Best-effort platform guess from the host name.
    ///
    /// Only used for logging before the download backend has resolved the
    /// real extractor; credentials are never chosen from this guess.
    pub fn platform_hint(&self) -> Option<Platform> {
        let url = url::Url::parse(&self.raw).ok()?;
        let host = url.host_str()?.trim_start_matches("www.");
        let platform = match host {
            "instagram.com" | "instagr.am" => Platform::Instagram,
            "youtube.com" | "m.youtube.com" | "music.youtube.com" | "youtu.be" => Platform::YouTube,
            "tiktok.com" | "vm.tiktok.com" => Platform::TikTok,
            "soundcloud.com" | "on.soundcloud.com" => Platform::SoundCloud,
            other => Platform::Other(other.to_string()),
        };
        Some(platform)
    }
}

impl fmt::Display for SourceLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Media platform as reported by the download backend's extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Instagram,
    YouTube,
    TikTok,
    SoundCloud,
    Other(String),
}

impl Platform {
    /// Parse an extractor name such as `Instagram`, `youtube:tab` or `TikTok`.
    pub fn from_extractor(name: &str) -> Self {
        let lower = name.to_lowercase();
        let base = lower.split(':').next().unwrap_or_default();
        match base {
            "instagram" => Self::Instagram,
            "youtube" => Self::YouTube,
            "tiktok" => Self::TikTok,
            "soundcloud" => Self::SoundCloud,
            _ => Self::Other(lower),
        }
    }

    /// Whether fetching from this platform needs a logged-in session.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Instagram)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instagram => f.write_str("instagram"),
            Self::YouTube => f.write_str("youtube"),
            Self::TikTok => f.write_str("tiktok"),
            Self::SoundCloud => f.write_str("soundcloud"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// Locally materialized audio for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioAsset {
    pub path: PathBuf,
    pub duration: Duration,
    /// Sanitized identifier of the request that owns this file
    pub request_id: String,
}

impl AudioAsset {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Best match returned by the recognition service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecognitionMatch {
    /// Song title (never empty)
    pub title: String,
    /// Artist name (never empty)
    pub artist: String,
    pub album: Option<String>,
    /// Release year as reported by the service (free text, usually "2019")
    pub year: Option<String>,
    /// Canonical page for the track on the recognition service
    pub shazam_url: Option<String>,
    pub cover_art: Option<String>,
    /// Auxiliary lookup URL that resolves to the video-platform link
    pub cross_reference_hint: Option<String>,
}

/// Secondary (video-platform) link for an identified song
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossReferenceLink(pub String);

impl CrossReferenceLink {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Pipeline stage names, used for logging and timeout reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolving,
    Downloading,
    Trimming,
    Matching,
    CrossReferencing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Resolving => "resolving",
            Self::Downloading => "downloading",
            Self::Trimming => "trimming",
            Self::Matching => "matching",
            Self::CrossReferencing => "cross-referencing",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Coarse failure kind exposed to callers.
///
/// Error detail stays in the logs; callers only see the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Download,
    Storage,
    Recognition,
    Timeout(Stage),
}

/// Terminal value of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Success {
        track: RecognitionMatch,
        video_link: Option<CrossReferenceLink>,
    },
    NoMatch,
    Failure(FailureKind),
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Errors from acquiring audio
#[derive(Debug, Clone, thiserror::Error)]
pub enum AcquireError {
    #[error("Download failed: {0}")]
    Download(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Download backend not available: {0}")]
    ToolMissing(String),
}

impl From<std::io::Error> for AcquireError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Errors from probing or trimming audio
#[derive(Debug, Clone, thiserror::Error)]
pub enum SegmentError {
    #[error("Failed to read audio properties: {0}")]
    Probe(String),

    #[error("Failed to trim audio: {0}")]
    Trim(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Errors from the recognition service
#[derive(Debug, Clone, thiserror::Error)]
pub enum RecognitionError {
    #[error("Recognition backend not available: {0}")]
    ToolMissing(String),

    #[error("Recognition request failed: {0}")]
    Service(String),

    #[error("Failed to parse recognition response: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_from_extractor() {
        assert_eq!(Platform::from_extractor("Instagram"), Platform::Instagram);
        assert_eq!(Platform::from_extractor("youtube:tab"), Platform::YouTube);
        assert_eq!(Platform::from_extractor("TikTok"), Platform::TikTok);
        assert_eq!(
            Platform::from_extractor("Vimeo"),
            Platform::Other("vimeo".to_string())
        );
    }

    #[test]
    fn test_only_instagram_requires_login() {
        assert!(Platform::Instagram.requires_login());
        assert!(!Platform::YouTube.requires_login());
        assert!(!Platform::Other("instagram-ish".to_string()).requires_login());
    }

    #[test]
    fn test_platform_hint_from_host() {
        let link = SourceLink::new("https://www.instagram.com/reel/abc/");
        assert_eq!(link.platform_hint(), Some(Platform::Instagram));

        let link = SourceLink::new("https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(link.platform_hint(), Some(Platform::YouTube));

        let link = SourceLink::new("not a url");
        assert_eq!(link.platform_hint(), None);
    }

    #[test]
    fn test_outcome_is_success() {
        let success = PipelineOutcome::Success {
            track: RecognitionMatch::default(),
            video_link: None,
        };
        assert!(success.is_success());
        assert!(!PipelineOutcome::NoMatch.is_success());
        assert!(!PipelineOutcome::Failure(FailureKind::Download).is_success());
    }
}
