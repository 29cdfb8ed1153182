//! Test utilities and fixtures for tunelink tests.
//!
//! This module provides recognition response fixtures and helpers for
//! "fake audio" files, which the mock audio tools use in place of real mp3s.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{write_fake_audio, read_fake_audio};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let dir = tempfile::tempdir().unwrap();
//!     let clip = dir.path().join("42.mp3");
//!     write_fake_audio(&clip, Duration::from_secs(90)).unwrap();
//!     // ... test logic
//! }
//! ```

use std::io;
use std::path::Path;
use std::time::Duration;

const FAKE_AUDIO_MAGIC: &str = "FAKEAUDIO:";

/// Writes a placeholder audio file that records only its duration.
///
/// Use [`read_fake_audio`] to get the duration back.
pub fn write_fake_audio(path: &Path, duration: Duration) -> io::Result<()> {
    std::fs::write(
        path,
        format!("{}{}", FAKE_AUDIO_MAGIC, duration.as_millis()),
    )
}

/// Reads the duration stored by [`write_fake_audio`].
pub fn read_fake_audio(path: &Path) -> io::Result<Duration> {
    let content = std::fs::read_to_string(path)?;
    content
        .trim()
        .strip_prefix(FAKE_AUDIO_MAGIC)
        .and_then(|ms| ms.parse::<u64>().ok())
        .map(Duration::from_millis)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "not a fake audio file"))
}

/// Captured-shape recognition response with one match.
pub const SAMPLE_TAG_JSON: &str = r#"{
    "matches": [
        {"id": "11432033", "offset": 4.531, "timeskew": 0.00012, "frequencyskew": 0.0}
    ],
    "location": {"accuracy": 0.01},
    "timestamp": 1700000000000,
    "timezone": "Europe/Kyiv",
    "track": {
        "layout": "5",
        "type": "MUSIC",
        "key": "11432033",
        "title": "Song A",
        "subtitle": "Artist B",
        "images": {
            "background": "https://is1-ssl.mzstatic.com/image/thumb/artist/800x800cc.jpg",
            "coverart": "https://is1-ssl.mzstatic.com/image/thumb/album/400x400cc.jpg",
            "coverarthq": "https://is1-ssl.mzstatic.com/image/thumb/album/800x800cc.jpg"
        },
        "share": {"subject": "Song A - Artist B", "href": "https://www.shazam.com/track/11432033/song-a"},
        "url": "https://www.shazam.com/track/11432033/song-a",
        "genres": {"primary": "Pop"},
        "sections": [
            {
                "type": "SONG",
                "metapages": [],
                "tabname": "Song",
                "metadata": [
                    {"title": "Album", "text": "First Album"},
                    {"title": "Label", "text": "Some Label"},
                    {"title": "Released", "text": "2019"}
                ]
            },
            {
                "type": "VIDEO",
                "tabname": "Video",
                "youtubeurl": "https://cdn.shazam.com/video/v3/-/GB/web/11432033/youtube/video?q=Artist+B+Song+A"
            },
            {
                "type": "LYRICS",
                "tabname": "Lyrics",
                "text": ["First line", "Second line"]
            }
        ]
    },
    "tagid": "3f1b5a8e-0000-0000-0000-000000000000"
}"#;

/// Recognition response when nothing matched.
pub const SAMPLE_NO_MATCH_JSON: &str = r#"{
    "matches": [],
    "location": {"accuracy": 0.01},
    "timestamp": 1700000000000,
    "timezone": "Europe/Kyiv",
    "tagid": "3f1b5a8e-0000-0000-0000-000000000001",
    "retryms": 12000
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_audio_preserves_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp3");

        write_fake_audio(&path, Duration::from_millis(83_700)).unwrap();
        assert_eq!(read_fake_audio(&path).unwrap(), Duration::from_millis(83_700));
    }

    #[test]
    fn test_read_rejects_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("real.mp3");
        std::fs::write(&path, b"ID3\x04\x00").unwrap();

        assert!(read_fake_audio(&path).is_err());
    }

    #[test]
    fn test_fixtures_are_valid_json() {
        serde_json::from_str::<serde_json::Value>(SAMPLE_TAG_JSON).unwrap();
        serde_json::from_str::<serde_json::Value>(SAMPLE_NO_MATCH_JSON).unwrap();
    }
}
