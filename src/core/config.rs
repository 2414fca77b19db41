//! Application configuration management
//!
//! Handles loading settings from `config.toml` plus environment overrides:
//! - Gemini model selection
//! - Gemini API endpoint override

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{GitCliError, Result};

/// Environment variable overriding the configured model
pub const GEMINI_MODEL_ENV: &str = "GEMINI_MODEL";

/// Environment variable overriding the API endpoint
pub const GEMINI_API_BASE_ENV: &str = "GEMINI_API_BASE";

/// Default Gemini API base URL
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Available Gemini models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GeminiModel {
    /// Gemini 2.5 Flash-Lite
    #[serde(rename = "gemini-2.5-flash-lite")]
    Gemini25FlashLite,
    /// Gemini 2.0 Flash (default)
    #[default]
    #[serde(rename = "gemini-2.0-flash")]
    Gemini20Flash,
    /// Gemini 2.5 Flash
    #[serde(rename = "gemini-2.5-flash")]
    Gemini25Flash,
}

impl GeminiModel {
    /// Get the API model identifier
    pub fn api_name(&self) -> &'static str {
        match self {
            GeminiModel::Gemini25FlashLite => "gemini-2.5-flash-lite",
            GeminiModel::Gemini20Flash => "gemini-2.0-flash",
            GeminiModel::Gemini25Flash => "gemini-2.5-flash",
        }
    }

    /// Get a human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            GeminiModel::Gemini25FlashLite => "Gemini 2.5 Flash-Lite",
            GeminiModel::Gemini20Flash => "Gemini 2.0 Flash",
            GeminiModel::Gemini25Flash => "Gemini 2.5 Flash",
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|m| m.api_name() == s)
    }

    /// Get all available models
    pub fn all() -> &'static [GeminiModel] {
        &[
            GeminiModel::Gemini25FlashLite,
            GeminiModel::Gemini20Flash,
            GeminiModel::Gemini25Flash,
        ]
    }
}

impl std::fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.api_name())
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Selected Gemini model for commit message generation
    #[serde(default)]
    pub gemini_model: GeminiModel,

    /// Alternative API base URL (proxies, tests)
    #[serde(default)]
    pub api_base: Option<String>,
}

impl Config {
    /// Load configuration from the user config file and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Ok(path) => Self::load_from(&path)?,
            // No home directory: nothing to read, defaults apply
            Err(_) => Config::default(),
        };
        config.apply_env_overrides(
            std::env::var(GEMINI_MODEL_ENV).ok(),
            std::env::var(GEMINI_API_BASE_ENV).ok(),
        )?;
        Ok(config)
    }

    /// Load configuration from a file, or defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply `GEMINI_MODEL` / `GEMINI_API_BASE` values; empty values are ignored
    pub fn apply_env_overrides(
        &mut self,
        model: Option<String>,
        api_base: Option<String>,
    ) -> Result<()> {
        if let Some(name) = model.filter(|v| !v.trim().is_empty()) {
            self.gemini_model = GeminiModel::parse(name.trim()).ok_or_else(|| {
                GitCliError::Config(format!(
                    "Invalid model '{}' in {}. Available models: {}",
                    name,
                    GEMINI_MODEL_ENV,
                    GeminiModel::all()
                        .iter()
                        .map(|m| m.api_name())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })?;
        }

        if let Some(base) = api_base.filter(|v| !v.trim().is_empty()) {
            self.api_base = Some(base.trim().to_string());
        }

        Ok(())
    }

    /// Endpoint to send generation requests to
    pub fn api_base(&self) -> &str {
        self.api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "git-cli", "git-cli")
            .ok_or_else(|| GitCliError::Config("Could not determine config directory".into()))?;

        Ok(project_dirs.config_dir().join("config.toml"))
    }
}
