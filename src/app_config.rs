use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs;
use std::path::{Path, PathBuf};

use crate::language_utils;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Language of the lyrics (ISO tag)
    #[serde(default = "default_language")]
    pub language: String,

    /// Hide romanized duplicates of words already shown
    #[serde(default = "default_true")]
    pub filter_romanizations: bool,

    /// Dictionary sources to register at startup
    #[serde(default)]
    pub dictionaries: Vec<DictionaryConfig>,

    /// Playback simulation settings
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// One dictionary file to register
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DictionaryConfig {
    // @field: Language the dictionary belongs to
    pub language: String,

    // @field: Name the dictionary is registered under
    pub name: String,

    // @field: Path to the JSON or TSV source
    pub path: PathBuf,
}

/// Playback configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlaybackConfig {
    // @field: Interval between position ticks
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    // @field: Step used by skip forward/backward
    #[serde(default = "default_skip_step_ms")]
    pub skip_step_ms: u64,

    // @field: Start playing as soon as the lyrics are loaded
    #[serde(default = "default_true")]
    pub autoplay: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            skip_step_ms: default_skip_step_ms(),
            autoplay: true,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_language() -> String {
    "ja".to_string()
}

fn default_true() -> bool {
    true
}

fn default_tick_interval_ms() -> u64 {
    100
}

fn default_skip_step_ms() -> u64 {
    5000
}

impl Config {
    /// Read a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Read a configuration file, writing the default one first if it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            let config = Config::default();
            config.save(path)?;
            log::info!("Created default configuration at {}", path.display());
            return Ok(config);
        }
        Self::from_file(path)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, config_json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        language_utils::validate_language_code(&self.language)?;

        if self.playback.tick_interval_ms == 0 {
            return Err(anyhow!("Playback tick interval must be greater than zero"));
        }

        for dictionary in &self.dictionaries {
            language_utils::validate_language_code(&dictionary.language)
                .with_context(|| format!("Dictionary '{}' has an invalid language", dictionary.name))?;
            if dictionary.name.trim().is_empty() {
                return Err(anyhow!("Dictionary at {} has no name", dictionary.path.display()));
            }
        }

        Ok(())
    }

    /// Dictionaries configured for a language, in declaration order
    pub fn dictionaries_for(&self, language: &str) -> Vec<&DictionaryConfig> {
        self.dictionaries
            .iter()
            .filter(|d| language_utils::language_codes_match(&d.language, language))
            .collect()
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            language: default_language(),
            filter_romanizations: true,
            dictionaries: Vec::new(),
            playback: PlaybackConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
