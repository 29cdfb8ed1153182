//! Recognition response Data Transfer Objects
//!
//! These types mirror the JSON returned by the Shazam tag endpoint (as
//! printed by `songrec audio-file-to-recognized-song`). Every field is
//! optional or defaulted: the service omits whole sections freely.
//! DO NOT use these types outside the shazam module - convert to domain types.
//!
//! Example response (trimmed):
//! ```json
//! {
//!   "matches": [{"id": "11432033", "offset": 4.53, "timeskew": 0.0001}],
//!   "track": {
//!     "key": "11432033",
//!     "title": "Song A",
//!     "subtitle": "Artist B",
//!     "url": "https://www.shazam.com/track/11432033/song-a",
//!     "images": {"coverart": "https://is1-ssl.mzstatic.com/.../400x400cc.jpg"},
//!     "sections": [
//!       {"type": "SONG", "metadata": [
//!         {"title": "Album", "text": "First Album"},
//!         {"title": "Label", "text": "Some Label"},
//!         {"title": "Released", "text": "2019"}]},
//!       {"type": "VIDEO", "youtubeurl": "https://cdn.shazam.com/video/v3/-/GB/web/11432033/youtube/video?q=..."}
//!     ]
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Top-level recognition response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TagResponse {
    /// Candidate matches, best first. Empty when nothing matched.
    #[serde(default)]
    pub matches: Vec<Match>,
    /// Details of the top candidate (absent when nothing matched)
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Match {
    pub id: Option<String>,
    pub offset: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Track {
    pub key: Option<String>,
    pub title: Option<String>,
    /// Artist name
    pub subtitle: Option<String>,
    /// Canonical track page
    pub url: Option<String>,
    pub images: Option<Images>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Images {
    pub coverart: Option<String>,
    pub coverarthq: Option<String>,
    pub background: Option<String>,
}

/// A tab of track details (song info, video, lyrics, ...)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Section {
    #[serde(rename = "type")]
    pub section_type: Option<String>,
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
    /// Auxiliary endpoint resolving to the track's video
    pub youtubeurl: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MetadataEntry {
    pub title: Option<String>,
    pub text: Option<String>,
}

/// Body returned by the auxiliary video endpoint
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VideoResponse {
    pub caption: Option<String>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Action {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub action_type: Option<String>,
    pub uri: Option<String>,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs accept what the real service returns.
// ============================================================================
