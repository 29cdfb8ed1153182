//! Trait definitions for the pipeline's external capabilities.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses the CLI/HTTP backed implementations, while tests
//! substitute the mocks at the bottom of this file.
//!
//! # Example
//!
//! ```ignore
//! use tunelink::recognition::traits::RecognitionApi;
//!
//! async fn identify(api: &dyn RecognitionApi, clip: &Path) {
//!     if let Some(found) = api.recognize(clip).await? { ... }
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::PlatformCredentials;
use crate::recognition::acquire::MediaInfo;
use crate::recognition::domain::{
    AcquireError, CrossReferenceLink, RecognitionError, RecognitionMatch, SegmentError, SourceLink,
};

/// Media download backend.
#[async_trait]
pub trait MediaDownloader: Send + Sync {
    /// Resolve platform and basic metadata without downloading anything.
    async fn probe(&self, link: &SourceLink) -> Result<MediaInfo, AcquireError>;

    /// Download the linked media as mp3 audio.
    ///
    /// `output_template` contains a `%(ext)s` placeholder that the backend
    /// replaces with the final extension. `credentials` is only ever set for
    /// platforms that require a login.
    async fn download(
        &self,
        link: &SourceLink,
        output_template: &Path,
        credentials: Option<&PlatformCredentials>,
    ) -> Result<(), AcquireError>;
}

/// Local audio inspection and editing.
#[async_trait]
pub trait AudioTools: Send + Sync {
    /// Total playing time of an audio file.
    async fn duration(&self, path: &Path) -> Result<Duration, SegmentError>;

    /// Write everything after `start` from `input` into `output` (mp3).
    async fn trim_start(
        &self,
        input: &Path,
        start: Duration,
        output: &Path,
    ) -> Result<(), SegmentError>;
}

/// Acoustic fingerprint recognition.
#[async_trait]
pub trait RecognitionApi: Send + Sync {
    /// Identify the audio at `path`.
    ///
    /// `Ok(None)` means the service answered but found no match.
    async fn recognize(&self, path: &Path) -> Result<Option<RecognitionMatch>, RecognitionError>;
}

/// Secondary link lookup. Best effort: every failure is `None`.
#[async_trait]
pub trait CrossReferenceApi: Send + Sync {
    async fn resolve(&self, hint: &str) -> Option<CrossReferenceLink>;
}
