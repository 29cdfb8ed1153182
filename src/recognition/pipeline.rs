//! Pipeline orchestration - one message in, one outcome out.
//!
//! Stages run strictly in order:
//! 1. Resolve the first link in the message (no link: nothing happens)
//! 2. Download the audio (per-request file, serialized per caller)
//! 3. Trim the intro of long clips
//! 4. Match against the recognition service
//! 5. On a match, look up the video link (best effort)
//!
//! Every network stage runs under its own timeout. The request's audio
//! files are deleted when the request finishes, whatever the outcome.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::OwnedMutexGuard;

use crate::config::{Config, TimeoutConfig};
use crate::error::{Result, ResultExt};
use crate::recognition::{
    acquire::{AudioAcquirer, StorageLayout, YtDlp, sanitize_request_id},
    crossref::CrossReferenceClient,
    domain::{
        AcquireError, FailureKind, PipelineOutcome, RecognitionError, SegmentError, SourceLink,
        Stage,
    },
    link,
    segment::{FfmpegTools, SegmentSelector, TrimSettings},
    shazam::SongRecClient,
    traits::{AudioTools, CrossReferenceApi, RecognitionApi},
};

/// Time budget for each stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTimeouts {
    pub download: Duration,
    pub trim: Duration,
    pub recognition: Duration,
    pub cross_reference: Duration,
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self::from(&TimeoutConfig::default())
    }
}

impl From<&TimeoutConfig> for StageTimeouts {
    fn from(config: &TimeoutConfig) -> Self {
        Self {
            download: config.download(),
            trim: config.trim(),
            recognition: config.recognition(),
            cross_reference: config.cross_reference(),
        }
    }
}

/// One slot per active request identifier.
///
/// Requests sharing an identifier queue on the same slot; the slot entry is
/// dropped from the map once nobody holds or waits for it.
#[derive(Default)]
pub struct RequestSlots {
    slots: Mutex<HashMap<String, Slot>>,
}

#[derive(Default)]
struct Slot {
    lock: Arc<tokio::sync::Mutex<()>>,
    /// Holder plus waiters
    users: usize,
}

impl RequestSlots {
    /// Wait until no other request holds `id`, then take it.
    ///
    /// Cancelling the returned future while it waits leaves no entry behind.
    pub async fn acquire(&self, id: &str) -> SlotGuard<'_> {
        let lock = {
            let mut slots = self.slots.lock();
            let slot = slots.entry(id.to_string()).or_default();
            slot.users += 1;
            slot.lock.clone()
        };
        // Registered before waiting so a cancelled waiter still signs out
        let mut held = SlotGuard {
            owner: self,
            id: id.to_string(),
            guard: None,
        };
        held.guard = Some(lock.lock_owned().await);
        held
    }

    /// Number of identifiers currently held or waited on
    pub fn active(&self) -> usize {
        self.slots.lock().len()
    }
}

/// Held for the lifetime of one request
pub struct SlotGuard<'a> {
    owner: &'a RequestSlots,
    id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        let mut slots = self.owner.slots.lock();
        // Release while holding the map lock so no new waiter can slip in
        // between the release and the removal check.
        self.guard.take();
        if let Some(slot) = slots.get_mut(&self.id) {
            slot.users = slot.users.saturating_sub(1);
            if slot.users == 0 {
                slots.remove(&self.id);
            }
        }
    }
}

/// Deletes every file of a request when dropped, partial downloads included
struct AssetGuard<'a> {
    layout: &'a StorageLayout,
    request_id: &'a str,
}

impl Drop for AssetGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.layout.remove_request_files(self.request_id) {
            tracing::warn!(
                request_id = self.request_id,
                "Failed to clean up {:?}: {}",
                self.layout.dir(),
                e
            );
        }
    }
}

/// Song identification pipeline
pub struct Pipeline {
    acquirer: AudioAcquirer,
    selector: SegmentSelector,
    recognizer: Arc<dyn RecognitionApi>,
    cross_reference: Arc<dyn CrossReferenceApi>,
    timeouts: StageTimeouts,
    slots: RequestSlots,
}

impl Pipeline {
    pub fn new(
        acquirer: AudioAcquirer,
        selector: SegmentSelector,
        recognizer: Arc<dyn RecognitionApi>,
        cross_reference: Arc<dyn CrossReferenceApi>,
        timeouts: StageTimeouts,
    ) -> Self {
        Self {
            acquirer,
            selector,
            recognizer,
            cross_reference,
            timeouts,
            slots: RequestSlots::default(),
        }
    }

    /// Build a pipeline with the CLI/HTTP backends named in `config`.
    ///
    /// Runs each tool's `--version` synchronously, so call it before
    /// entering the async runtime.
    pub fn from_config(config: &Config) -> Result<Self> {
        let ytdlp = YtDlp::new(&config.tools.ytdlp);
        let ffmpeg = FfmpegTools::new(&config.tools.ffmpeg);
        let songrec = SongRecClient::new(&config.tools.songrec);
        for (name, available) in [
            (&config.tools.ytdlp, ytdlp.is_available()),
            (&config.tools.ffmpeg, ffmpeg.is_available()),
            (&config.tools.songrec, songrec.is_available()),
        ] {
            if !available {
                tracing::warn!("{} not found, requests will fail until it is installed", name);
            }
        }

        let layout = StorageLayout::new(&config.storage.dir);
        let tools: Arc<dyn AudioTools> = Arc::new(ffmpeg);

        let acquirer = AudioAcquirer::new(
            Arc::new(ytdlp),
            tools.clone(),
            layout.clone(),
            config.credentials.instagram(),
        );
        let selector = SegmentSelector::new(tools, TrimSettings::from(&config.trim), layout);
        let cross_reference = CrossReferenceClient::new()
            .with_context("Building the cross-reference HTTP client")?;

        Ok(Self::new(
            acquirer,
            selector,
            Arc::new(songrec),
            Arc::new(cross_reference),
            StageTimeouts::from(&config.timeouts),
        ))
    }

    /// Handle one incoming message from `caller_id`.
    ///
    /// Returns `None` when the text contains no link: no download, no
    /// network call, nothing to report.
    pub async fn handle(&self, caller_id: &str, text: &str) -> Option<PipelineOutcome> {
        let Some(link) = link::find_first_url(text) else {
            tracing::trace!(caller_id, "No link in message, ignoring");
            return None;
        };
        Some(self.run(caller_id, &link).await)
    }

    /// Run all stages for `link` on behalf of `caller_id`.
    pub async fn run(&self, caller_id: &str, link: &SourceLink) -> PipelineOutcome {
        let request_id = sanitize_request_id(caller_id);
        tracing::debug!(
            request_id = %request_id,
            stage = %Stage::Resolving,
            platform_hint = ?link.platform_hint(),
            "Handling {}",
            link
        );

        let slot = self.slots.acquire(&request_id).await;
        let assets = AssetGuard {
            layout: self.acquirer.layout(),
            request_id: &request_id,
        };

        let outcome = self
            .run_stages(&request_id, link)
            .await
            .unwrap_or_else(PipelineOutcome::Failure);

        // Files go first, then the slot, so a queued request never sees them
        drop(assets);
        drop(slot);

        tracing::info!(
            request_id = %request_id,
            stage = %Stage::Done,
            "Request finished: {}",
            describe(&outcome)
        );
        outcome
    }

    /// Number of caller identifiers with a request in flight or queued
    pub fn active_requests(&self) -> usize {
        self.slots.active()
    }

    async fn run_stages(
        &self,
        request_id: &str,
        link: &SourceLink,
    ) -> std::result::Result<PipelineOutcome, FailureKind> {
        let asset = bounded(
            request_id,
            Stage::Downloading,
            self.timeouts.download,
            self.acquirer.acquire(link, request_id),
            acquire_failure,
        )
        .await?;

        let segment = bounded(
            request_id,
            Stage::Trimming,
            self.timeouts.trim,
            self.selector.select(asset),
            segment_failure,
        )
        .await?;

        let found = bounded(
            request_id,
            Stage::Matching,
            self.timeouts.recognition,
            self.recognizer.recognize(segment.path()),
            |_: &RecognitionError| FailureKind::Recognition,
        )
        .await?;

        let Some(track) = found else {
            return Ok(PipelineOutcome::NoMatch);
        };

        let video_link = match track.cross_reference_hint.as_deref() {
            Some(hint) => {
                tracing::debug!(request_id, stage = %Stage::CrossReferencing, "Resolving video link");
                tokio::time::timeout(self.timeouts.cross_reference, self.cross_reference.resolve(hint))
                    .await
                    .unwrap_or_else(|_| {
                        tracing::warn!(request_id, "Cross-reference lookup timed out");
                        None
                    })
            }
            None => None,
        };

        Ok(PipelineOutcome::Success { track, video_link })
    }
}

/// Run one stage under a time limit, logging and classifying any failure.
async fn bounded<T, E: std::fmt::Display>(
    request_id: &str,
    stage: Stage,
    limit: Duration,
    work: impl Future<Output = std::result::Result<T, E>>,
    classify: impl FnOnce(&E) -> FailureKind,
) -> std::result::Result<T, FailureKind> {
    tracing::debug!(request_id, stage = %stage, "Entering stage");
    match tokio::time::timeout(limit, work).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            tracing::warn!(request_id, stage = %stage, "Stage failed: {}", e);
            Err(classify(&e))
        }
        Err(_) => {
            tracing::warn!(request_id, stage = %stage, "Stage timed out after {:?}", limit);
            Err(FailureKind::Timeout(stage))
        }
    }
}

fn acquire_failure(error: &AcquireError) -> FailureKind {
    match error {
        AcquireError::Storage(_) => FailureKind::Storage,
        AcquireError::Download(_) | AcquireError::ToolMissing(_) => FailureKind::Download,
    }
}

fn segment_failure(error: &SegmentError) -> FailureKind {
    match error {
        SegmentError::Storage(_) => FailureKind::Storage,
        // A clip that can't be decoded or re-encoded is a bad download
        SegmentError::Probe(_) | SegmentError::Trim(_) => FailureKind::Download,
    }
}

fn describe(outcome: &PipelineOutcome) -> String {
    match outcome {
        PipelineOutcome::Success { track, video_link } => format!(
            "matched {} - {}{}",
            track.artist,
            track.title,
            if video_link.is_some() { " (+video)" } else { "" }
        ),
        PipelineOutcome::NoMatch => "no match".to_string(),
        PipelineOutcome::Failure(kind) => format!("failed ({:?})", kind),
    }
}
