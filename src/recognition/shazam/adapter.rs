//! Adapter layer: convert recognition DTOs to domain models
//!
//! This is the ONLY place where shazam DTO types are converted to domain
//! types.

use super::dto;
use crate::recognition::domain::{RecognitionError, RecognitionMatch};

/// Offsets of album and release year in the song section's metadata
const ALBUM_POSITION: usize = 0;
const RELEASED_POSITION: usize = 2;

/// Convert a tag response to the best match, or `None` if nothing matched.
pub fn to_match(response: dto::TagResponse) -> Result<Option<RecognitionMatch>, RecognitionError> {
    if response.matches.is_empty() {
        return Ok(None);
    }

    let track = response.track.ok_or_else(|| {
        RecognitionError::Parse("response has matches but no track".to_string())
    })?;

    let title = non_empty(track.title)
        .ok_or_else(|| RecognitionError::Parse("matched track has no title".to_string()))?;
    let artist = non_empty(track.subtitle)
        .ok_or_else(|| RecognitionError::Parse("matched track has no artist".to_string()))?;

    let song_section = track.sections.first();
    let album = song_section.and_then(|s| metadata_text(&s.metadata, ALBUM_POSITION));
    let year = song_section.and_then(|s| metadata_text(&s.metadata, RELEASED_POSITION));

    let cross_reference_hint = track
        .sections
        .iter()
        .find_map(|s| non_empty(s.youtubeurl.clone()));

    let cover_art = track
        .images
        .and_then(|i| non_empty(i.coverart).or(non_empty(i.coverarthq)));

    Ok(Some(RecognitionMatch {
        title,
        artist,
        album,
        year,
        shazam_url: non_empty(track.url),
        cover_art,
        cross_reference_hint,
    }))
}

/// Text of the metadata entry at `position`; entry titles are not consulted.
fn metadata_text(entries: &[dto::MetadataEntry], position: usize) -> Option<String> {
    entries
        .get(position)
        .and_then(|e| non_empty(e.text.clone()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Extract the video link from the auxiliary endpoint's body
pub fn to_video_link(response: dto::VideoResponse) -> Option<String> {
    response
        .actions
        .into_iter()
        .next()
        .and_then(|action| non_empty(action.uri))
}
