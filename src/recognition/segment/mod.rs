//! Segment selection ("intro trimming").
//!
//! Long clips often open with speech or silence, which hurts fingerprint
//! matching. Clips longer than a threshold (60 s) lose a fixed leading
//! fraction (7%) before they are submitted; shorter clips are used as-is.
//! The trim is a heuristic, not content analysis.

mod ffmpeg;

use std::sync::Arc;
use std::time::Duration;

use crate::config::TrimConfig;
use crate::recognition::acquire::StorageLayout;
use crate::recognition::domain::{AudioAsset, SegmentError};
use crate::recognition::traits::AudioTools;

pub use ffmpeg::FfmpegTools;

/// Trim heuristic parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimSettings {
    /// Only clips strictly longer than this are trimmed
    pub threshold: Duration,
    /// Leading fraction to drop, clamped to [0, 1)
    pub fraction: f64,
    /// Minimum audio left after trimming; zero disables the floor
    pub min_kept: Duration,
}

impl Default for TrimSettings {
    fn default() -> Self {
        Self::from(&TrimConfig::default())
    }
}

impl From<&TrimConfig> for TrimSettings {
    fn from(config: &TrimConfig) -> Self {
        Self {
            threshold: Duration::from_secs(config.threshold_secs),
            fraction: config.fraction,
            min_kept: Duration::from_secs(config.min_kept_secs),
        }
    }
}

/// Where to cut a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimPlan {
    /// Offset of the first retained sample
    pub start: Duration,
    /// Length of the retained suffix
    pub kept: Duration,
}

/// Decide whether and where to trim a clip of `duration`.
///
/// Works in whole milliseconds. Returns `None` when the clip should be used
/// unchanged.
pub fn trim_plan(duration: Duration, settings: &TrimSettings) -> Option<TrimPlan> {
    if duration <= settings.threshold {
        return None;
    }

    let total_ms = duration.as_millis() as u64;
    let fraction = if settings.fraction.is_finite() {
        settings.fraction.clamp(0.0, 0.999)
    } else {
        0.0
    };
    let mut start_ms = (total_ms as f64 * fraction).round() as u64;

    let min_kept_ms = settings.min_kept.as_millis() as u64;
    if min_kept_ms > 0 {
        if total_ms <= min_kept_ms {
            return None;
        }
        start_ms = start_ms.min(total_ms - min_kept_ms);
    }

    if start_ms == 0 {
        return None;
    }

    Some(TrimPlan {
        start: Duration::from_millis(start_ms),
        kept: Duration::from_millis(total_ms - start_ms),
    })
}

/// Applies the trim heuristic to downloaded assets, re-encoding in place
pub struct SegmentSelector {
    tools: Arc<dyn AudioTools>,
    settings: TrimSettings,
    layout: StorageLayout,
}

impl SegmentSelector {
    pub fn new(tools: Arc<dyn AudioTools>, settings: TrimSettings, layout: StorageLayout) -> Self {
        Self {
            tools,
            settings,
            layout,
        }
    }

    /// Return the asset to fingerprint: either `asset` untouched, or the
    /// same file rewritten to hold only the retained suffix.
    pub async fn select(&self, asset: AudioAsset) -> Result<AudioAsset, SegmentError> {
        let Some(plan) = trim_plan(asset.duration, &self.settings) else {
            tracing::debug!(
                request_id = %asset.request_id,
                "Clip is {:?}, no trim needed",
                asset.duration
            );
            return Ok(asset);
        };

        let scratch = self.layout.trim_path(&asset.request_id);
        self.tools
            .trim_start(&asset.path, plan.start, &scratch)
            .await?;
        tokio::fs::rename(&scratch, &asset.path)
            .await
            .map_err(|e| SegmentError::Storage(e.to_string()))?;

        let duration = self.tools.duration(&asset.path).await?;
        tracing::debug!(
            request_id = %asset.request_id,
            "Trimmed {:?} intro, {:?} left",
            plan.start,
            duration
        );

        Ok(AudioAsset { duration, ..asset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::traits::mocks::MockAudioTools;
    use crate::test_utils::write_fake_audio;
    use std::sync::atomic::Ordering;

    fn selector(tools: Arc<MockAudioTools>, dir: &std::path::Path) -> SegmentSelector {
        SegmentSelector::new(tools, TrimSettings::default(), StorageLayout::new(dir))
    }

    fn asset_at(dir: &std::path::Path, duration: Duration) -> AudioAsset {
        let path = dir.join("1.mp3");
        write_fake_audio(&path, duration).unwrap();
        AudioAsset {
            path,
            duration,
            request_id: "1".to_string(),
        }
    }

    #[test]
    fn test_ninety_seconds_keeps_83_7() {
        let plan = trim_plan(Duration::from_secs(90), &TrimSettings::default()).unwrap();
        assert_eq!(plan.start, Duration::from_millis(6_300));
        assert_eq!(plan.kept, Duration::from_millis(83_700));
    }

    #[test]
    fn test_exactly_threshold_untouched() {
        assert!(trim_plan(Duration::from_secs(60), &TrimSettings::default()).is_none());
        assert!(trim_plan(Duration::from_millis(60_001), &TrimSettings::default()).is_some());
    }

    #[test]
    fn test_floor_limits_trim() {
        let settings = TrimSettings {
            threshold: Duration::ZERO,
            fraction: 0.5,
            min_kept: Duration::from_secs(20),
        };
        let plan = trim_plan(Duration::from_secs(30), &settings).unwrap();
        assert_eq!(plan.kept, Duration::from_secs(20));

        // Shorter than the floor: nothing to trim
        assert!(trim_plan(Duration::from_secs(15), &settings).is_none());
    }

    #[test]
    fn test_nonsense_fraction_is_clamped() {
        let settings = TrimSettings {
            fraction: f64::NAN,
            ..TrimSettings::default()
        };
        assert!(trim_plan(Duration::from_secs(90), &settings).is_none());

        let settings = TrimSettings {
            fraction: 3.0,
            ..TrimSettings::default()
        };
        let plan = trim_plan(Duration::from_secs(100), &settings).unwrap();
        assert!(plan.kept > Duration::ZERO);
    }

    #[tokio::test]
    async fn test_short_clip_returned_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let tools = Arc::new(MockAudioTools::default());
        let asset = asset_at(dir.path(), Duration::from_secs(45));

        let selected = selector(tools.clone(), dir.path())
            .select(asset.clone())
            .await
            .unwrap();

        assert_eq!(selected, asset);
        assert_eq!(tools.trims.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_long_clip_trimmed_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let tools = Arc::new(MockAudioTools::default());
        let asset = asset_at(dir.path(), Duration::from_secs(90));

        let selected = selector(tools.clone(), dir.path())
            .select(asset.clone())
            .await
            .unwrap();

        assert_eq!(selected.path, asset.path);
        assert_eq!(selected.duration, Duration::from_millis(83_700));
        assert!(!dir.path().join("1.trim.mp3").exists());
        assert_eq!(tools.trims.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_trim_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let tools = Arc::new(MockAudioTools {
            fail_trim: true,
            ..Default::default()
        });
        let asset = asset_at(dir.path(), Duration::from_secs(120));

        let result = selector(tools, dir.path()).select(asset).await;
        assert!(matches!(result, Err(SegmentError::Trim(_))));
    }
}
