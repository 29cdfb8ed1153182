//! Song identification from links.
//!
//! A message goes through five stages, each in its own module:
//!
//! - [`link`]: find the first URL in free-form text
//! - [`acquire`]: download the linked media as mp3 (yt-dlp)
//! - [`segment`]: trim the intro of long clips (lofty + ffmpeg)
//! - [`shazam`]: fingerprint and match the clip (songrec)
//! - [`crossref`]: resolve the video-platform link for a match
//!
//! [`pipeline`] runs them in order for one caller, and [`reply`] renders
//! the outcome for the chat front end.

pub mod acquire;
pub mod crossref;
pub mod domain;
pub mod link;
pub mod pipeline;
pub mod reply;
pub mod segment;
pub mod shazam;
pub mod traits;

pub use domain::{FailureKind, PipelineOutcome, RecognitionMatch, SourceLink, Stage};
pub use pipeline::{Pipeline, StageTimeouts};
pub use reply::Reply;
