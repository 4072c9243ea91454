use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;

const DEFAULT_CAPACITY: u32 = 10;
const DEFAULT_TITLE: &str = "Activity";

fn default_capacity() -> u32 {
    DEFAULT_CAPACITY
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

/// How `recurra expand` prints occurrences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Ics,
}

/// Global configuration at ~/.config/recurra/config.toml
///
/// Everything here is a fallback: values in a rule file and command-line
/// flags take precedence.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Capacity for series whose rule file does not set one
    #[serde(default = "default_capacity")]
    pub default_capacity: u32,

    #[serde(default)]
    pub default_format: OutputFormat,

    /// Title used in ICS output when the rule file has none
    #[serde(default = "default_title")]
    pub default_title: String,

    /// IANA timezone for ICS output (e.g. "Europe/Amsterdam")
    pub timezone: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_capacity: DEFAULT_CAPACITY,
            default_format: OutputFormat::default(),
            default_title: default_title(),
            timezone: None,
        }
    }
}

/// Get the config directory path (~/.config/recurra)
pub fn config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("recurra");
    Ok(config_dir)
}

/// Get the config file path (~/.config/recurra/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load config from ~/.config/recurra/config.toml, or defaults if it doesn't exist
pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

    Ok(config)
}
