//! tunelink - identify songs from links to short clips.
//!
//! A message containing a link goes in; the linked media is downloaded, its
//! intro trimmed, the clip fingerprinted against a recognition service and
//! the match rendered with its canonical and video links.

pub mod cli;
pub mod config;
pub mod error;
pub mod recognition;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("tunelink=info".parse()?))
        .init();

    cli::run_command(&args)
}
