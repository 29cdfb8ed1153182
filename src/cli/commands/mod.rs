//! CLI command definitions and dispatch.
//!
//! The CLI stands in for the chat front end. Each subcommand is implemented
//! in its own submodule:
//! - `identify`: one-shot identification and the line-based `listen` loop
//! - `info`: static `/start` and `/support` messages, tool checks

mod identify;
mod info;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::{self, Config};

pub use identify::{cmd_identify, cmd_listen};
pub use info::{cmd_check_tools, cmd_start, cmd_support};

/// Identify songs from links to short audio/video clips
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "TUNELINK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Identify the song behind the first link in a message
    Identify {
        /// Message text (the first link in it is used)
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Caller identifier, used to name the temporary audio file
        #[arg(long, default_value = "cli")]
        caller: String,
    },
    /// Read `<caller_id> <message>` lines from stdin and answer each one
    Listen,
    /// Print the introduction message
    Start,
    /// Print the support message and its links
    Support,
    /// Check if yt-dlp, ffmpeg and songrec are installed
    CheckTools,
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Identify { text, caller } => {
            let rt = Runtime::new()?;
            cmd_identify(&rt, &load_config(cli)?, &text.join(" "), caller)
        }
        Commands::Listen => {
            let rt = Runtime::new()?;
            cmd_listen(&rt, &load_config(cli)?)
        }
        Commands::Start => cmd_start(),
        Commands::Support => cmd_support(),
        Commands::CheckTools => cmd_check_tools(&load_config(cli)?),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Load the explicit config file if one was given, else the default one.
fn load_config(cli: &Cli) -> crate::error::Result<Config> {
    match &cli.config {
        Some(path) => {
            let mut config = config::load_from(path)?;
            config.apply_env(|key| std::env::var(key).ok());
            Ok(config)
        }
        None => Ok(config::load()),
    }
}
