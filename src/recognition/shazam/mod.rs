//! Shazam recognition integration
//!
//! The signature and HTTP exchange are handled by SongRec; this module owns
//! the response shapes and their conversion into [`RecognitionMatch`].
//!
//! [`RecognitionMatch`]: crate::recognition::domain::RecognitionMatch

mod adapter;
mod client;
pub mod dto;

pub use adapter::{to_match, to_video_link};
pub use client::SongRecClient;
