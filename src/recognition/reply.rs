//! Rendering of pipeline outcomes for the chat front end.
//!
//! A [`Reply`] is what a messenger would send back: markdown text, an
//! optional image (the cover art, sent as a photo with the text as its
//! caption) and a list of labelled link buttons.

use std::fmt;

use crate::recognition::domain::{FailureKind, PipelineOutcome};

pub const NO_MATCH_TEXT: &str = "🚫No matches found!";
pub const FAILURE_TEXT: &str = "⚠️ Something went wrong while processing that link. Please try again later.";
pub const TIMEOUT_TEXT: &str = "⏳ That took too long, so I gave up. Please try again later.";

/// A labelled link button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub url: String,
}

impl Button {
    fn new(label: &str, url: &str) -> Self {
        Self {
            label: label.to_string(),
            url: url.to_string(),
        }
    }
}

/// A rendered reply
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    pub text: String,
    pub photo: Option<String>,
    pub buttons: Vec<Button>,
}

impl Reply {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }

    /// Render the result of one pipeline run
    pub fn from_outcome(outcome: &PipelineOutcome) -> Self {
        match outcome {
            PipelineOutcome::Success { track, video_link } => {
                let mut text = format!(
                    "🎵 **Song:** {}\n🎤 **Artist:** {}\n",
                    track.title, track.artist
                );
                if let Some(album) = track.album.as_deref().filter(|a| !a.is_empty()) {
                    text.push_str(&format!("📀 **Album:** {}\n", album));
                }
                if let Some(year) = track.year.as_deref().filter(|y| !y.is_empty()) {
                    text.push_str(&format!("📅 **Year:** {}\n", year));
                }

                let mut buttons = Vec::new();
                if let Some(url) = &track.shazam_url {
                    buttons.push(Button::new("Shazam Link", url));
                }
                if let Some(link) = video_link {
                    buttons.push(Button::new("Youtube Link", link.as_str()));
                }

                Self {
                    text,
                    photo: track.cover_art.clone(),
                    buttons,
                }
            }
            PipelineOutcome::NoMatch => Self::plain(NO_MATCH_TEXT),
            PipelineOutcome::Failure(FailureKind::Timeout(_)) => Self::plain(TIMEOUT_TEXT),
            PipelineOutcome::Failure(_) => Self::plain(FAILURE_TEXT),
        }
    }

    /// Introduction shown for `/start`
    pub fn start() -> Self {
        Self::plain(concat!(
            "🎶 Welcome to the Music Recognition Bot! 🎶\n",
            "I can help you identify songs from audio links. Just send me any URL that contains audio, ",
            "and I'll do my best to tell you the song's name, the artist, ",
            "and provide links to the song on Shazam and YouTube if available.\n",
            "Let's discover some music together! 🚀"
        ))
    }

    /// Support/donation message shown for `/support`
    pub fn support() -> Self {
        Self {
            text: concat!(
                "Hey there!👋\n",
                "If you enjoy using this bot and would like to support its development, ",
                "here are a few ways you can contribute:\n\n",
                "🌐 Donate: Help cover costs and invest in improvements with a financial contribution.\n\n",
                "💬 Spread the Word: Share the bot with your friends and communities.\n\n",
                "🌟 Feedback: Provide input to make this bot even better.\n\n",
                "🙏 Thanks for your support!"
            )
            .to_string(),
            photo: None,
            buttons: vec![
                Button::new("Monobank Jar", "https://send.monobank.ua/jar/9AvXq7doBs"),
                Button::new("Ko-fi", "https://ko-fi.com/fanaticexplorer"),
                Button::new("Buy Me A Coffee", "https://www.buymeacoffee.com/fanaticexplorer"),
            ],
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(photo) = &self.photo {
            writeln!(f, "[photo] {}", photo)?;
        }
        write!(f, "{}", self.text.trim_end())?;
        for button in &self.buttons {
            write!(f, "\n[{}] {}", button.label, button.url)?;
        }
        Ok(())
    }
}
