//! Audio acquisition: turn a link into a local mp3 file.
//!
//! The acquirer resolves the platform first, so that stored credentials are
//! only handed to the backend for the one platform that needs them. Each
//! request's file lives at `<storage>/<request id>.mp3`; the path is
//! deterministic, which is why the pipeline never runs two acquisitions for
//! the same identifier at once.

mod ytdlp;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::PlatformCredentials;
use crate::recognition::domain::{AcquireError, AudioAsset, Platform, SourceLink};
use crate::recognition::traits::{AudioTools, MediaDownloader};

pub use ytdlp::YtDlp;

/// What the download backend knows about a link before fetching it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaInfo {
    pub platform: Platform,
    pub duration: Option<Duration>,
    pub title: Option<String>,
}

/// File naming for per-request audio
#[derive(Debug, Clone)]
pub struct StorageLayout {
    dir: PathBuf,
}

impl StorageLayout {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Final audio file for a request
    pub fn asset_path(&self, request_id: &str) -> PathBuf {
        self.dir.join(format!("{}.mp3", request_id))
    }

    /// Scratch file the trimmer writes before replacing the asset
    pub fn trim_path(&self, request_id: &str) -> PathBuf {
        self.dir.join(format!("{}.trim.mp3", request_id))
    }

    /// Output template handed to the download backend
    pub fn output_template(&self, request_id: &str) -> PathBuf {
        self.dir.join(format!("{}.%(ext)s", request_id))
    }

    /// Whether `file_name` belongs to `request_id`.
    ///
    /// Covers the final asset, the trim scratch file and whatever the
    /// download backend writes on the way (`.webm`, `.part`, `.ytdl`, ...).
    /// Sanitized ids contain no dots, so the prefix cannot match another id.
    pub fn is_request_file(file_name: &str, request_id: &str) -> bool {
        file_name
            .strip_prefix(request_id)
            .is_some_and(|rest| rest.starts_with('.'))
    }

    /// Delete every file belonging to `request_id`, returning how many went.
    ///
    /// A missing storage directory counts as already clean.
    pub fn remove_request_files(&self, request_id: &str) -> std::io::Result<usize> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            if !Self::is_request_file(&name.to_string_lossy(), request_id) {
                continue;
            }
            match std::fs::remove_file(entry.path()) {
                Ok(()) => {
                    tracing::debug!("Removed {:?}", entry.path());
                    removed += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(removed)
    }

    /// Make sure the directory exists and no earlier file is left for this id.
    pub async fn prepare(&self, request_id: &str) -> Result<(), AcquireError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let layout = self.clone();
        let id = request_id.to_string();
        let removed = tokio::task::spawn_blocking(move || layout.remove_request_files(&id))
            .await
            .map_err(|e| AcquireError::Storage(format!("Task join error: {}", e)))??;
        if removed > 0 {
            tracing::debug!(request_id, "Removed {} stale file(s)", removed);
        }
        Ok(())
    }
}

/// Make a caller identifier safe to use as a file name.
pub fn sanitize_request_id(id: &str) -> String {
    let sanitized: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() {
        "anonymous".to_string()
    } else {
        sanitized
    }
}

/// Fetches linked media into the storage area
pub struct AudioAcquirer {
    downloader: Arc<dyn MediaDownloader>,
    tools: Arc<dyn AudioTools>,
    layout: StorageLayout,
    /// Login used only when the resolved platform requires one
    login: Option<PlatformCredentials>,
}

impl AudioAcquirer {
    pub fn new(
        downloader: Arc<dyn MediaDownloader>,
        tools: Arc<dyn AudioTools>,
        layout: StorageLayout,
        login: Option<PlatformCredentials>,
    ) -> Self {
        Self {
            downloader,
            tools,
            layout,
            login,
        }
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Download `link` for the request `request_id`.
    ///
    /// `request_id` must already be sanitized (see [`sanitize_request_id`]).
    pub async fn acquire(
        &self,
        link: &SourceLink,
        request_id: &str,
    ) -> Result<AudioAsset, AcquireError> {
        let info = self.downloader.probe(link).await?;
        tracing::debug!(
            request_id,
            platform = %info.platform,
            title = info.title.as_deref().unwrap_or("?"),
            reported_duration = ?info.duration,
            "Resolved platform for {}",
            link
        );

        let credentials = if info.platform.requires_login() {
            if self.login.is_none() {
                tracing::warn!(
                    "{} requires a login but no credentials are configured",
                    info.platform
                );
            }
            self.login.as_ref()
        } else {
            None
        };

        self.layout.prepare(request_id).await?;

        self.downloader
            .download(link, &self.layout.output_template(request_id), credentials)
            .await?;

        let path = self.layout.asset_path(request_id);
        if !tokio::fs::try_exists(&path).await? {
            return Err(AcquireError::Download(format!(
                "backend reported success but {:?} was not written",
                path
            )));
        }

        let duration = self
            .tools
            .duration(&path)
            .await
            .map_err(|e| AcquireError::Download(e.to_string()))?;

        tracing::info!(
            request_id,
            duration_ms = duration.as_millis() as u64,
            "Downloaded audio from {}",
            info.platform
        );

        Ok(AudioAsset {
            path,
            duration,
            request_id: request_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::traits::mocks::{MockAudioTools, MockDownloader};
    use crate::test_utils::write_fake_audio;

    fn login() -> PlatformCredentials {
        PlatformCredentials {
            username: "insta-user".to_string(),
            password: "insta-pass".to_string(),
        }
    }

    fn acquirer(
        downloader: Arc<MockDownloader>,
        dir: &Path,
        login: Option<PlatformCredentials>,
    ) -> AudioAcquirer {
        AudioAcquirer::new(
            downloader,
            Arc::new(MockAudioTools::default()),
            StorageLayout::new(dir),
            login,
        )
    }

    #[test]
    fn test_sanitize_request_id() {
        assert_eq!(sanitize_request_id("12345"), "12345");
        assert_eq!(sanitize_request_id("../etc/passwd"), "___etc_passwd");
        assert_eq!(sanitize_request_id("user name"), "user_name");
        assert_eq!(sanitize_request_id(""), "anonymous");
    }

    #[test]
    fn test_layout_paths() {
        let layout = StorageLayout::new("/tmp/files");
        assert_eq!(layout.asset_path("42"), PathBuf::from("/tmp/files/42.mp3"));
        assert_eq!(
            layout.output_template("42"),
            PathBuf::from("/tmp/files/42.%(ext)s")
        );
        assert_eq!(layout.trim_path("42"), PathBuf::from("/tmp/files/42.trim.mp3"));
    }

    #[tokio::test]
    async fn test_acquire_creates_dir_and_reads_duration() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("user_files");
        let downloader = Arc::new(MockDownloader::with_clip(
            Platform::YouTube,
            Duration::from_secs(90),
        ));

        let asset = acquirer(downloader, &dir, None)
            .acquire(&SourceLink::new("https://youtu.be/x"), "7")
            .await
            .unwrap();

        assert_eq!(asset.path, dir.join("7.mp3"));
        assert_eq!(asset.duration, Duration::from_secs(90));
        assert_eq!(asset.request_id, "7");
        assert!(asset.path.exists());
    }

    #[tokio::test]
    async fn test_credentials_only_for_login_platform() {
        let dir = tempfile::tempdir().unwrap();

        let insta = Arc::new(MockDownloader::with_clip(
            Platform::Instagram,
            Duration::from_secs(30),
        ));
        acquirer(insta.clone(), dir.path(), Some(login()))
            .acquire(&SourceLink::new("https://instagram.com/reel/a"), "1")
            .await
            .unwrap();
        assert_eq!(insta.calls()[0].credentials, Some(login()));

        let youtube = Arc::new(MockDownloader::with_clip(
            Platform::YouTube,
            Duration::from_secs(30),
        ));
        acquirer(youtube.clone(), dir.path(), Some(login()))
            .acquire(&SourceLink::new("https://youtu.be/a"), "2")
            .await
            .unwrap();
        assert_eq!(youtube.calls()[0].credentials, None);
    }

    #[tokio::test]
    async fn test_stale_file_removed_before_download() {
        let dir = tempfile::tempdir().unwrap();
        write_fake_audio(&dir.path().join("9.mp3"), Duration::from_secs(5)).unwrap();
        write_fake_audio(&dir.path().join("9.trim.mp3"), Duration::from_secs(5)).unwrap();

        let downloader = Arc::new(MockDownloader::with_clip(
            Platform::TikTok,
            Duration::from_secs(45),
        ));
        let asset = acquirer(downloader.clone(), dir.path(), None)
            .acquire(&SourceLink::new("https://tiktok.com/@a/video/1"), "9")
            .await
            .unwrap();

        assert!(!downloader.calls()[0].stale_file_present);
        assert!(!dir.path().join("9.trim.mp3").exists());
        assert_eq!(asset.duration, Duration::from_secs(45));
    }

    #[test]
    fn test_is_request_file() {
        assert!(StorageLayout::is_request_file("9.mp3", "9"));
        assert!(StorageLayout::is_request_file("9.webm.part", "9"));
        assert!(StorageLayout::is_request_file("9.trim.mp3", "9"));
        assert!(!StorageLayout::is_request_file("90.mp3", "9"));
        assert!(!StorageLayout::is_request_file("9", "9"));
        assert!(!StorageLayout::is_request_file("x9.mp3", "9"));
    }

    #[tokio::test]
    async fn test_prepare_clears_interrupted_transfers_only_for_that_id() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path());
        for name in ["9.webm.part", "9.webm", "9.mp3.ytdl", "90.mp3", "10.mp3"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        layout.prepare("9").await.unwrap();

        let mut left: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        left.sort();
        assert_eq!(left, ["10.mp3", "90.mp3"]);
    }

    #[test]
    fn test_remove_request_files_without_dir() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path().join("missing"));
        assert_eq!(layout.remove_request_files("1").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_download_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Arc::new(MockDownloader::failing(AcquireError::Download(
            "unsupported URL".to_string(),
        )));

        let result = acquirer(downloader, dir.path(), None)
            .acquire(&SourceLink::new("https://example.com/x"), "3")
            .await;
        assert!(matches!(result, Err(AcquireError::Download(_))));
    }

    #[tokio::test]
    async fn test_missing_output_is_download_error() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Arc::new(MockDownloader {
            skip_write: true,
            ..MockDownloader::with_clip(Platform::YouTube, Duration::from_secs(30))
        });

        let result = acquirer(downloader, dir.path(), None)
            .acquire(&SourceLink::new("https://youtu.be/x"), "4")
            .await;
        assert!(matches!(result, Err(AcquireError::Download(_))));
    }

    #[tokio::test]
    async fn test_unwritable_storage_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the directory should be
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, b"not a dir").unwrap();

        let downloader = Arc::new(MockDownloader::with_clip(
            Platform::YouTube,
            Duration::from_secs(30),
        ));
        let result = acquirer(downloader, &blocker.join("files"), None)
            .acquire(&SourceLink::new("https://youtu.be/x"), "5")
            .await;
        assert!(matches!(result, Err(AcquireError::Storage(_))));
    }
}
