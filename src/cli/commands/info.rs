//! Static replies and environment checks.

use crate::config::Config;
use crate::recognition::{
    Reply, acquire::YtDlp, segment::FfmpegTools, shazam::SongRecClient,
};

/// Print the introduction message
pub fn cmd_start() -> anyhow::Result<()> {
    println!("{}", Reply::start());
    Ok(())
}

/// Print the support message
pub fn cmd_support() -> anyhow::Result<()> {
    println!("{}", Reply::support());
    Ok(())
}

/// Check the external tools the pipeline shells out to
pub fn cmd_check_tools(config: &Config) -> anyhow::Result<()> {
    println!("Checking recognition tools...\n");

    let mut missing = false;

    match YtDlp::new(&config.tools.ytdlp).version() {
        Some(version) => println!("✓ yt-dlp: {}", version),
        None => {
            missing = true;
            println!("✗ yt-dlp ({}): NOT FOUND", config.tools.ytdlp);
            println!("  Install: pip install yt-dlp  (or your package manager)");
        }
    }

    match FfmpegTools::new(&config.tools.ffmpeg).version() {
        Some(version) => println!("✓ ffmpeg: {}", version),
        None => {
            missing = true;
            println!("✗ ffmpeg ({}): NOT FOUND", config.tools.ffmpeg);
            println!("  Windows: winget install Gyan.FFmpeg");
            println!("  macOS:   brew install ffmpeg");
            println!("  Linux:   apt install ffmpeg");
        }
    }

    match SongRecClient::new(&config.tools.songrec).version() {
        Some(version) => println!("✓ songrec: {}", version),
        None => {
            missing = true;
            println!("✗ songrec ({}): NOT FOUND", config.tools.songrec);
            println!("  Install: cargo install songrec  (or apt install songrec)");
        }
    }

    println!();
    println!("Credentials:");
    if config.credentials.instagram().is_some() {
        println!("✓ Instagram login: set");
    } else {
        println!("✗ Instagram login: not set (Instagram links may fail)");
        println!("  Set INSTAGRAM_USERNAME and INSTAGRAM_PASSWORD or [credentials] in config.toml");
    }

    println!();
    println!("Storage: {:?}", config.storage.dir);

    if missing {
        anyhow::bail!("required tools are missing");
    }
    Ok(())
}
