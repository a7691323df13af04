use crate::error::{RollError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name searched for in the working directory and the user config directory
pub const CONFIG_FILE_NAME: &str = "rolldev.toml";

/// Represents the complete configuration for roll-dev.
///
/// Carries everything the release gate would otherwise read from ambient
/// process state: the upstream it must verify, the confirmation token and
/// the archive publisher settings.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub confirmation: ConfirmationConfig,

    #[serde(default)]
    pub publish: Option<PublishConfig>,
}

fn default_remote() -> String {
    "upstream".to_string()
}

fn default_commit() -> String {
    "upstream/master".to_string()
}

fn default_dev_branch() -> String {
    "dev".to_string()
}

fn default_token() -> String {
    "yes".to_string()
}

fn default_channel() -> String {
    "dev".to_string()
}

/// The canonical shared repository validated before any mutation.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct UpstreamConfig {
    /// Name of the remote that must point at `url`
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Expected fetch URL of the upstream remote
    #[serde(default)]
    pub url: Option<String>,

    /// Commit rolled when `--commit` is not given
    #[serde(default = "default_commit")]
    pub default_commit: String,

    /// Branch on the upstream that receives the rolled commit
    #[serde(default = "default_dev_branch")]
    pub dev_branch: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            remote: default_remote(),
            url: None,
            default_commit: default_commit(),
            dev_branch: default_dev_branch(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConfirmationConfig {
    /// Exact, case-sensitive answer that confirms a roll
    #[serde(default = "default_token")]
    pub token: String,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        ConfirmationConfig {
            token: default_token(),
        }
    }
}

/// Archive publisher backend selection
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PublishBackend {
    /// Run external commands for the access check and the publish step
    Command,
    /// Copy an artifact into a local release directory
    Directory,
}

/// Configuration for the archive publisher.
///
/// `access_check` and `command` are used by the command backend,
/// `artifact` and `destination` by the directory backend.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PublishConfig {
    pub backend: PublishBackend,

    #[serde(default = "default_channel")]
    pub channel: String,

    #[serde(default)]
    pub access_check: Vec<String>,

    #[serde(default)]
    pub command: Vec<String>,

    #[serde(default)]
    pub artifact: Option<PathBuf>,

    #[serde(default)]
    pub destination: Option<PathBuf>,
}

impl Config {
    /// The upstream URL a roll must be verified against
    pub fn expected_upstream_url(&self) -> Result<&str> {
        match self.upstream.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(RollError::config(format!(
                "upstream.url is not set; add the expected URL of remote '{}' to {}",
                self.upstream.remote, CONFIG_FILE_NAME
            ))),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `rolldev.toml` in current directory
/// 3. `rolldev.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let path = if let Some(path) = config_path {
        path.to_path_buf()
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        PathBuf::from(CONFIG_FILE_NAME)
    } else if let Some(config_dir) = dirs::config_dir() {
        let candidate = config_dir.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            candidate
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    log::debug!("loading configuration from {}", path.display());
    let config_str = fs::read_to_string(&path).map_err(|e| {
        RollError::config(format!("Cannot read {}: {}", path.display(), e))
    })?;

    parse_config(&config_str)
        .map_err(|e| RollError::config(format!("{}: {}", path.display(), e)))
}

/// Parses configuration from TOML text
pub fn parse_config(text: &str) -> std::result::Result<Config, toml::de::Error> {
    toml::from_str(text)
}
