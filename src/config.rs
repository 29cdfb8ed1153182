//! Configuration system using TOML files plus environment overrides.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\tunelink\config.toml
//! - macOS: ~/Library/Application Support/tunelink/config.toml
//! - Linux: ~/.config/tunelink/config.toml
//!
//! Every field has a default, so a missing or partial file is fine.
//! Credentials can also come from the environment (`INSTAGRAM_USERNAME`,
//! `INSTAGRAM_PASSWORD`), which wins over the file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Platform login credentials
    pub credentials: Credentials,

    /// Where per-request audio files live while a request is in flight
    pub storage: StorageConfig,

    /// Intro trimming heuristic
    pub trim: TrimConfig,

    /// Per-stage time budgets
    pub timeouts: TimeoutConfig,

    /// External tool binaries
    pub tools: ToolsConfig,
}

/// Login credentials for platforms that refuse anonymous downloads
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub instagram_username: Option<String>,
    pub instagram_password: Option<String>,
}

impl Credentials {
    /// Instagram login, if both halves are configured
    pub fn instagram(&self) -> Option<PlatformCredentials> {
        match (&self.instagram_username, &self.instagram_password) {
            (Some(username), Some(password)) if !username.is_empty() => Some(PlatformCredentials {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("instagram_username", &self.instagram_username)
            .field(
                "instagram_password",
                &self.instagram_password.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// A username/password pair scoped to a single platform.
#[derive(Clone, PartialEq, Eq)]
pub struct PlatformCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for PlatformCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Temporary audio storage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from(".cache"))
                .join("tunelink")
                .join("user_files"),
        }
    }
}

/// Intro trimming settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimConfig {
    /// Clips longer than this are trimmed
    pub threshold_secs: u64,

    /// Fraction of the clip dropped from the start (0.0 - 1.0)
    pub fraction: f64,

    /// Never keep less than this many seconds (0 = no floor)
    pub min_kept_secs: u64,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            threshold_secs: 60,
            fraction: 0.07,
            min_kept_secs: 0,
        }
    }
}

/// Per-stage timeouts in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub download_secs: u64,
    pub trim_secs: u64,
    pub recognition_secs: u64,
    pub cross_reference_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            download_secs: 300,
            trim_secs: 120,
            recognition_secs: 60,
            cross_reference_secs: 15,
        }
    }
}

impl TimeoutConfig {
    pub fn download(&self) -> Duration {
        Duration::from_secs(self.download_secs)
    }

    pub fn trim(&self) -> Duration {
        Duration::from_secs(self.trim_secs)
    }

    pub fn recognition(&self) -> Duration {
        Duration::from_secs(self.recognition_secs)
    }

    pub fn cross_reference(&self) -> Duration {
        Duration::from_secs(self.cross_reference_secs)
    }
}

/// External tool binaries (names on PATH or absolute paths)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ytdlp: String,
    pub ffmpeg: String,
    pub songrec: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp: "yt-dlp".to_string(),
            ffmpeg: "ffmpeg".to_string(),
            songrec: "songrec".to_string(),
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tunelink"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location, then apply environment overrides.
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let mut config = match config_path() {
        None => {
            tracing::warn!("Could not determine config directory, using defaults");
            Config::default()
        }
        Some(path) if !path.exists() => {
            tracing::info!("No config file found at {:?}, using defaults", path);
            Config::default()
        }
        Some(path) => load_from(&path).unwrap_or_else(|e| {
            tracing::error!("{}", e);
            tracing::warn!("Using default configuration");
            Config::default()
        }),
    };
    config.apply_env(|key| std::env::var(key).ok());
    config
}

/// Load configuration from an explicit file.
///
/// Unlike [`load`], a missing or broken file is an error: the caller asked
/// for this file specifically.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    let config = toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
    tracing::info!("Loaded config from {:?}", path);
    Ok(config)
}

impl Config {
    /// Override fields from environment-style variables.
    ///
    /// Takes a lookup function so callers (and tests) control the source.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(username) = lookup("INSTAGRAM_USERNAME") {
            self.credentials.instagram_username = Some(username);
        }
        if let Some(password) = lookup("INSTAGRAM_PASSWORD") {
            self.credentials.instagram_password = Some(password);
        }
        if let Some(dir) = lookup("TUNELINK_STORAGE_DIR") {
            self.storage.dir = PathBuf::from(dir);
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
}

// ============================================================================
// Tests
// ============================================================================
